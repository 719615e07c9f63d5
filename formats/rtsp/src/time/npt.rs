use std::{fmt, str::FromStr};

use crate::errors::RtspMessageError;

#[derive(Debug, Clone, PartialEq)]
pub enum Npt {
    Seconds(f64),
    HHMMSS {
        hours: u64,
        minutes: u8,
        seconds: f64,
    },
    Now,
}

impl Npt {
    pub fn as_seconds(&self) -> f64 {
        match self {
            Self::Seconds(v) => *v,
            Self::HHMMSS {
                hours,
                minutes,
                seconds,
            } => (*hours as f64) * 3600.0 + (*minutes as f64) * 60.0 + seconds,
            Self::Now => 0.0,
        }
    }
}

impl FromStr for Npt {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now" => Ok(Self::Now),
            s if s.contains(':') => {
                let parts: Vec<_> = s.split(':').collect();
                if parts.len() != 3 {
                    return Err(RtspMessageError::InvalidNpt(format!(
                        "npt hhmmss needs three fields: {}",
                        s
                    )));
                }
                Ok(Self::HHMMSS {
                    hours: parts[0].parse().map_err(|err| {
                        RtspMessageError::InvalidNpt(format!(
                            "npt hours: {}, {}",
                            parts[0], err
                        ))
                    })?,
                    minutes: parts[1].parse().map_err(|err| {
                        RtspMessageError::InvalidNpt(format!(
                            "npt minutes: {}, {}",
                            parts[1], err
                        ))
                    })?,
                    seconds: parts[2].parse().map_err(|err| {
                        RtspMessageError::InvalidNpt(format!(
                            "npt seconds: {}, {}",
                            parts[2], err
                        ))
                    })?,
                })
            }
            s => Ok(Self::Seconds(s.parse().map_err(|err| {
                RtspMessageError::InvalidNpt(format!("npt seconds form: {}, {}", s, err))
            })?)),
        }
    }
}

impl fmt::Display for Npt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => write!(f, "now"),
            Self::Seconds(v) => write!(f, "{}", v),
            Self::HHMMSS {
                hours,
                minutes,
                seconds,
            } => write!(f, "{}:{}:{}", hours, minutes, seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Npt;

    #[test]
    fn seconds_form() {
        assert_eq!("3.52".parse::<Npt>().unwrap().as_seconds(), 3.52);
    }

    #[test]
    fn hhmmss_form() {
        let npt: Npt = "0:10:20.5".parse().unwrap();
        assert_eq!(npt.as_seconds(), 620.5);
    }

    #[test]
    fn now_form() {
        assert_eq!("now".parse::<Npt>().unwrap(), Npt::Now);
    }
}
