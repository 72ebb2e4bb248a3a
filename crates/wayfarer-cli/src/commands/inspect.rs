use crate::output::OutputWriter;
use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;
use wayfarer_core::config::LayeredConfig;

#[derive(Debug, Serialize, Tabled)]
struct ConfigRow {
    key: String,
    value: String,
    source: String,
}

/// Print every effective setting with the layer it came from
pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    output.table(config_rows(config))
}

fn config_rows(config: &LayeredConfig) -> Vec<ConfigRow> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::config::CliConfigOverrides;

    #[test]
    fn test_rows_are_sorted_and_carry_source() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            feed_page_limit: Some(7),
            ..Default::default()
        });

        let rows = config_rows(&config);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let limit = rows.iter().find(|r| r.key == "feed.page_limit").unwrap();
        assert_eq!(limit.value, "7");
        assert_eq!(limit.source, "Cli");
    }
}
