//! Carga de configuración desde variables de entorno.
//! Convención `MODELFLOW_*`; todos los parámetros tienen default.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Raíz de la cache durable (manifiestos + blobs).
    pub cache_dir: PathBuf,
    /// Raíz del workspace de artefactos.
    pub workspace_dir: PathBuf,
    /// Intentos máximos ante errores de I/O transitorios.
    pub retry_max: u32,
}

impl FlowConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let cache_dir = env::var("MODELFLOW_CACHE_DIR").map(PathBuf::from)
                                                       .unwrap_or_else(|_| PathBuf::from(".modelflow/cache"));
        let workspace_dir = env::var("MODELFLOW_WORKSPACE_DIR").map(PathBuf::from)
                                                               .unwrap_or_else(|_| PathBuf::from("workspace"));
        let retry_max = env::var("MODELFLOW_RETRY_MAX").ok()
                                                       .and_then(|v| v.parse().ok())
                                                       .unwrap_or(3);
        Self { cache_dir,
               workspace_dir,
               retry_max }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
