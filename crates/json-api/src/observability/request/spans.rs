//! Route labels for request spans and metrics.

use uuid::Uuid;

/// Replace identifier segments so every order or notification shares one label.
pub(super) fn route_for_path(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{uuid}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_segments_are_collapsed() {
        let order = Uuid::now_v7();

        assert_eq!(
            route_for_path(&format!("/backorders/{order}/cancel")),
            "/backorders/{uuid}/cancel"
        );
    }

    #[test]
    fn plain_paths_are_unchanged() {
        assert_eq!(route_for_path("/"), "/");
        assert_eq!(route_for_path("/stock/availability"), "/stock/availability");
    }
}
