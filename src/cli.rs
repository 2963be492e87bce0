use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use holiday_planner::{PlannerConfig, Weekday};
use serde::Deserialize;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// TOML settings file with the `[planner]` table and the `public_holidays` list.
    #[clap(long, env = "HOLIDAY_PLANNER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the number of paid days off available.
    #[clap(long, env = "HOLIDAY_PLANNER_BUDGET")]
    pub budget: Option<u32>,

    /// Override the solver time limit.
    #[clap(long, env = "HOLIDAY_PLANNER_TIME_LIMIT")]
    pub time_limit: Option<humantime::Duration>,

    /// Override the preferred weekdays.
    #[clap(long, value_delimiter = ',', num_args = 1..)]
    pub preferred_weekdays: Option<Vec<Weekday>>,
}

impl Args {
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::read(path)?,
            None => Settings::default(),
        };
        if let Some(budget) = self.budget {
            settings.planner.budget = budget;
        }
        if let Some(time_limit) = self.time_limit {
            settings.planner.time_limit = time_limit.into();
        }
        if let Some(preferred_weekdays) = &self.preferred_weekdays {
            settings.planner.preferred_weekdays = preferred_weekdays.iter().copied().collect();
        }
        Ok(settings)
    }
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub public_holidays: BTreeSet<NaiveDate>,
}

impl Settings {
    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse `{}`", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parse_settings_ok() {
        let settings: Settings = toml::from_str(
            r#"
                public_holidays = ["2025-01-01", "2025-04-18"]

                [planner]
                budget = 25
                max_period_length = 14
            "#,
        )
        .unwrap();
        assert_eq!(settings.public_holidays.len(), 2);
        assert_eq!(settings.planner.budget, 25);
        assert_eq!(settings.planner.max_period_length, 14);
    }

    #[test]
    fn overrides_ok() {
        let args = Args::parse_from([
            "holiday-planner",
            "--budget",
            "12",
            "--time-limit",
            "2min",
            "--preferred-weekdays",
            "monday,friday",
        ]);
        let settings = args.load_settings().unwrap();
        assert_eq!(settings.planner.budget, 12);
        assert_eq!(settings.planner.time_limit, Duration::from_secs(120));
        assert_eq!(settings.planner.preferred_weekdays, Weekday::Monday | Weekday::Friday);
        assert!(settings.public_holidays.is_empty());
    }
}
