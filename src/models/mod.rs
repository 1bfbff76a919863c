use chrono::{DateTime, Utc};
use mongodb::bson;

pub mod destination;
pub mod envelope;
pub mod object_id;
pub mod user;

/// Current time at the millisecond precision MongoDB stores, so a record
/// returned from a write equals the same record read back later.
pub fn timestamp_now() -> DateTime<Utc> {
    bson::DateTime::now().to_chrono()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn timestamps_carry_whole_milliseconds() {
        let now = timestamp_now();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
        assert_eq!(bson::DateTime::from_chrono(now).to_chrono(), now);
    }
}
