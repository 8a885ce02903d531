//! JSON canónico: representación textual estable independiente del orden de
//! claves. Todo valor que participe en un fingerprint pasa por aquí.

use serde_json::Value;
use std::collections::BTreeMap;

/// Serializa un `Value` con claves de objeto ordenadas lexicográficamente.
/// Los arreglos conservan su orden: el orden declarado de inputs SÍ es
/// significativo, el de claves de parámetros no.
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap_or_default(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(to_canonical_json).collect();
            format!("[{}]", inner.join(","))
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&String, String> =
                map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let inner: Vec<String> = sorted.into_iter()
                                           .map(|(k, v)| {
                                               format!("{}:{}", serde_json::to_string(k).unwrap_or_default(), v)
                                           })
                                           .collect();
            format!("{{{}}}", inner.join(","))
        }
    }
}
