use std::{fmt, str::FromStr};

use npt::Npt;

use crate::errors::RtspMessageError;

pub mod npt;

/// A `Range` value in NPT form: `npt=start-[end]`. A missing start is
/// read as zero.
#[derive(Debug, Default, Clone)]
pub struct TimeRange {
    pub start: Option<Npt>,
    pub end: Option<Npt>,
}

impl TimeRange {
    pub fn start_seconds(&self) -> f64 {
        self.start.as_ref().map_or(0.0, Npt::as_seconds)
    }
}

impl FromStr for TimeRange {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (unit, value) = s.trim().split_once('=').ok_or_else(|| {
            RtspMessageError::InvalidTimeRange(format!("missing range unit: {}", s))
        })?;
        if unit != "npt" {
            return Err(RtspMessageError::InvalidTimeRange(format!(
                "unsupported range unit: {}",
                unit
            )));
        }
        let (start, end) = value.split_once('-').ok_or_else(|| {
            RtspMessageError::InvalidTimeRange(format!("missing '-' in npt range: {}", value))
        })?;
        Ok(Self {
            start: if start.is_empty() {
                None
            } else {
                Some(start.parse()?)
            },
            end: if end.is_empty() {
                None
            } else {
                Some(end.parse()?)
            },
        })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "npt=")?;
        match &self.start {
            Some(start) => write!(f, "{}", start)?,
            None => write!(f, "0")?,
        }
        write!(f, "-")?;
        if let Some(end) = &self.end {
            write!(f, "{}", end)?;
        }
        Ok(())
    }
}
