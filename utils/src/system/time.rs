use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

/// Seconds between the NTP epoch (1900-01-01) and the unix epoch (1970-01-01).
const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

/// Splits the 64 bit NTP timestamp of `at` into its (seconds, fraction)
/// halves. The fraction is in units of 1/2^32 seconds.
pub fn ntp_timestamp_halves(at: SystemTime) -> Result<(u32, u32), SystemTimeError> {
    let since_unix = at.duration_since(UNIX_EPOCH)?;
    let seconds = since_unix.as_secs().wrapping_add(NTP_UNIX_OFFSET_SECS);
    let fraction = ((since_unix.subsec_nanos() as u64) << 32) / 1_000_000_000;
    Ok((seconds as u32, fraction as u32))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    #[test]
    fn ntp_halves_at_unix_epoch() {
        let (seconds, fraction) = super::ntp_timestamp_halves(UNIX_EPOCH).unwrap();
        assert_eq!(seconds, 2_208_988_800);
        assert_eq!(fraction, 0);
    }

    #[test]
    fn ntp_fraction_of_half_second() {
        let at = UNIX_EPOCH + Duration::from_millis(500);
        let (_, fraction) = super::ntp_timestamp_halves(at).unwrap();
        assert_eq!(fraction, 1 << 31);
    }

    #[test]
    fn ntp_halves_are_monotonic() {
        let now = SystemTime::now();
        let later = now + Duration::from_secs(2);
        let (s0, _) = super::ntp_timestamp_halves(now).unwrap();
        let (s1, _) = super::ntp_timestamp_halves(later).unwrap();
        assert_eq!(s1 - s0, 2);
    }
}
