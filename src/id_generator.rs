use uuid::Uuid;

/// Identifier of the layer every fresh document starts with.
pub const INITIAL_LAYER_ID: &str = "layer-1";

/// Fresh, never reused identifier for a line.
pub fn generate_line_id() -> String {
    format!("line-{}", Uuid::new_v4())
}

/// Fresh, never reused identifier for a layer.
pub fn generate_layer_id() -> String {
    format!("layer-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = generate_line_id();
        let b = generate_line_id();
        assert!(a.starts_with("line-"));
        assert_ne!(a, b);
        assert!(generate_layer_id().starts_with("layer-"));
    }
}
