use crate::apply::StyleMap;

/// Resolve a property the way a browser reports it when nothing declares it
pub fn computed_value(styles: &StyleMap, property: &str) -> String {
    if let Some(value) = styles.get(property) {
        return value.clone();
    }

    match property {
        "color" => "rgb(0, 0, 0)",
        "background-color" => "rgba(0, 0, 0, 0)",
        "background-image" => "none",
        _ => "",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        let styles = StyleMap::new();
        assert_eq!(computed_value(&styles, "color"), "rgb(0, 0, 0)");
        assert_eq!(computed_value(&styles, "background-color"), "rgba(0, 0, 0, 0)");
        assert_eq!(computed_value(&styles, "background-image"), "none");
    }
}
