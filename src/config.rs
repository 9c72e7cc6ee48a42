pub const TABLE_NAME_ENV: &str = "DB_TABLE_NAME";
pub const TABLE_NAME_DEFAULT: &str = "subscriptions";

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: TABLE_NAME_DEFAULT.into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let table_name = lookup(TABLE_NAME_ENV)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(TABLE_NAME_DEFAULT.into());

        Self { table_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_table_name() {
        let config = Config::from_lookup(|key| {
            (key == TABLE_NAME_ENV).then(|| "newsletter-prod".to_string())
        });
        assert_eq!(config.table_name, "newsletter-prod");
    }

    #[test]
    fn falls_back_to_default_when_unset_or_blank() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
        assert_eq!(
            Config::from_lookup(|_| Some("   ".to_string())).table_name,
            TABLE_NAME_DEFAULT
        );
    }
}
