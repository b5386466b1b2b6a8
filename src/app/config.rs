use std::path::Path;

use crate::clock::DayBoundary;
use crate::config::ResolvedConfig;

pub fn config_output(config_path: &Path, config: &ResolvedConfig) -> serde_json::Value {
    let timezone = match &config.day_boundary {
        DayBoundary::Local => "local".to_string(),
        DayBoundary::Named(tz) => tz.name().to_string(),
    };
    serde_json::json!({
        "config_file": config_path.display().to_string(),
        "data_directory": config.data_dir.display().to_string(),
        "currency": config.currency,
        "timezone": timezone,
        "display": config.display,
        "challenges": config.challenges,
        "analytics": config.analytics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_paths_and_settings() {
        let config = ResolvedConfig::with_data_dir("/tmp/spendwise");
        let out = config_output(Path::new("/tmp/spendwise/spendwise.toml"), &config);
        assert_eq!(out["data_directory"], "/tmp/spendwise");
        assert_eq!(out["timezone"], "local");
        assert_eq!(out["currency"], "USD");
        assert_eq!(out["analytics"]["top_n"], 5);
    }
}
