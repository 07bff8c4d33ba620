use crate::Channel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// One channel's decoded values, ready for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRecord {
    pub channel: String,
    pub magnitude: u32,
    pub values: Vec<i64>,
    pub fields: BTreeMap<String, i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl SensorRecord {
    pub fn new(channel: Channel, values: Vec<i64>) -> Self {
        Self::at(channel, values, Some(OffsetDateTime::now_utc()))
    }

    pub fn at(channel: Channel, values: Vec<i64>, ts: Option<OffsetDateTime>) -> Self {
        let fields = channel
            .fields()
            .iter()
            .zip(&values)
            .map(|(name, v)| ((*name).to_string(), *v))
            .collect();
        Self {
            channel: channel.to_string(),
            magnitude: channel.magnitude(),
            values,
            fields,
            ts: ts.and_then(|t| {
                t.format(&time::format_description::well_known::Rfc3339)
                    .ok()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TempChannel;

    #[test]
    fn fields_are_named() {
        let rec = SensorRecord::at(Channel::Temp(TempChannel::Temp2), vec![600, 500, 415], None);
        assert_eq!(rec.channel, "temp2");
        assert_eq!(rec.magnitude, 1);
        assert_eq!(rec.fields["hyst"], 500);
        assert_eq!(rec.fields["input"], 415);
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("\"ts\""));
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let ts = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let rec = SensorRecord::at(Channel::Vid, vec![350], Some(ts));
        assert_eq!(rec.ts.as_deref(), Some("1970-01-01T00:00:00Z"));
    }
}
