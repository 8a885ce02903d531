//! Constantes del motor core.
//!
//! Este módulo agrupa valores estáticos que participan en el cálculo de
//! fingerprints y en la compatibilidad entre versiones del motor. Cambios en
//! estas constantes invalidan determinísticamente la cache aunque la
//! definición y los datos no cambien.

/// Versión lógica del motor. Forma parte del `StageFingerprintInput`: un
/// cambio incompatible del engine recalcula todos los fingerprints sin tocar
/// entradas ni parámetros. Mantener estable mientras no haya cambios
/// incompatibles.
pub const ENGINE_VERSION: &str = "MF1.0";
