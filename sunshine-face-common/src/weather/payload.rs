//! 天气数据负载
//!
//! 配套设备在固定路径下发布一个 JSON 映射：
//! `{"highestTemperature": "25°", "lowestTemperature": "16°", "weatherIcon": "<asset>"}`

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{AssetRef, PayloadError, Temperature};

/// 线上格式，字段都可缺省
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherMap {
    #[serde(
        rename = "highestTemperature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub highest_temperature: Option<Temperature>,
    #[serde(
        rename = "lowestTemperature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lowest_temperature: Option<Temperature>,
    #[serde(
        rename = "weatherIcon",
        default,
        deserialize_with = "asset_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub weather_icon: Option<AssetRef>,
}

/// 图标引用不是字符串或超出容量时按无图标处理，温度照常使用
fn asset_or_none<'de, D>(deserializer: D) -> Result<Option<AssetRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| AssetRef::try_from(s).ok()))
}

/// 校验后的天气负载，两个温度保证非空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherPayload {
    pub high: Temperature,
    pub low: Temperature,
    pub icon: Option<AssetRef>,
}

impl WeatherPayload {
    pub fn decode(blob: &[u8]) -> Result<Self, PayloadError> {
        let map: WeatherMap =
            serde_json::from_slice(blob).map_err(|_| PayloadError::InvalidFormat)?;
        Self::try_from(map)
    }
}

impl TryFrom<WeatherMap> for WeatherPayload {
    type Error = PayloadError;

    fn try_from(map: WeatherMap) -> Result<Self, Self::Error> {
        let high = map
            .highest_temperature
            .filter(|t| !t.is_empty())
            .ok_or(PayloadError::MissingHighTemperature)?;
        let low = map
            .lowest_temperature
            .filter(|t| !t.is_empty())
            .ok_or(PayloadError::MissingLowTemperature)?;

        Ok(Self {
            high,
            low,
            icon: map.weather_icon.filter(|a| !a.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_payload() {
        let payload = WeatherPayload::decode(
            r#"{"highestTemperature":"25°","lowestTemperature":"16°","weatherIcon":"asset-7"}"#
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(payload.high.as_str(), "25°");
        assert_eq!(payload.low.as_str(), "16°");
        assert_eq!(payload.icon.as_deref(), Some("asset-7"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let payload = WeatherPayload::decode(
            br#"{"highestTemperature":"9","lowestTemperature":"1","timestamp":123}"#,
        )
        .unwrap();
        assert_eq!(payload.icon, None);
    }

    #[test]
    fn empty_icon_reference_means_no_icon() {
        let payload = WeatherPayload::decode(
            br#"{"highestTemperature":"9","lowestTemperature":"1","weatherIcon":""}"#,
        )
        .unwrap();
        assert_eq!(payload.icon, None);
    }

    #[test]
    fn long_temperature_text_is_kept_whole() {
        let payload = WeatherPayload::decode(
            r#"{"highestTemperature":"-12.5°C (feels -18°C)","lowestTemperature":"-20.25°C (feels -27°C)"}"#
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(payload.high.as_str(), "-12.5°C (feels -18°C)");
        assert_eq!(payload.low.as_str(), "-20.25°C (feels -27°C)");
    }

    #[test]
    fn oversized_icon_reference_keeps_temperatures() {
        let asset = "a".repeat(65);
        let blob = format!(
            r#"{{"highestTemperature":"9","lowestTemperature":"1","weatherIcon":"{asset}"}}"#
        );
        let payload = WeatherPayload::decode(blob.as_bytes()).unwrap();
        assert_eq!(payload.high.as_str(), "9");
        assert_eq!(payload.low.as_str(), "1");
        assert_eq!(payload.icon, None);
    }

    #[test]
    fn non_string_icon_reference_keeps_temperatures() {
        for icon in ["42", "{\"id\":7}", "null", "[1,2]"] {
            let blob = format!(
                r#"{{"highestTemperature":"9","lowestTemperature":"1","weatherIcon":{icon}}}"#
            );
            let payload = WeatherPayload::decode(blob.as_bytes()).unwrap();
            assert_eq!(payload.high.as_str(), "9");
            assert_eq!(payload.icon, None, "icon {icon}");
        }
    }

    #[test]
    fn missing_or_empty_temperature_is_malformed() {
        assert_eq!(
            WeatherPayload::decode(br#"{"lowestTemperature":"1"}"#).unwrap_err(),
            PayloadError::MissingHighTemperature
        );
        assert_eq!(
            WeatherPayload::decode(br#"{"highestTemperature":"9","lowestTemperature":""}"#)
                .unwrap_err(),
            PayloadError::MissingLowTemperature
        );
    }

    #[test]
    fn non_json_blob_is_malformed() {
        assert_eq!(
            WeatherPayload::decode(&[0xff, 0x00, 0x13]).unwrap_err(),
            PayloadError::InvalidFormat
        );
    }

    #[test]
    fn map_serializes_with_wire_keys() {
        let map = WeatherMap {
            highest_temperature: Some(Temperature::from("25°")),
            lowest_temperature: Some(Temperature::from("16°")),
            weather_icon: None,
        };
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"highestTemperature":"25°","lowestTemperature":"16°"}"#);
    }
}
