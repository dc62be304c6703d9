//! 帧内容组合
//!
//! 决定每种模式下必须出现哪些内容，具体像素位置交给渲染器：
//! - 常亮模式只显示 `h:mm`，交互模式显示 `h:mm:ss` 和日期
//! - 图标只在交互模式显示，没有图标时整块省略
//! - 已知的最高/最低温度在两种模式下都显示

use sunshine_face_common::*;

pub fn compose_frame(
    clock: &ClockState,
    weather: &WeatherState,
    mode: &DisplayMode,
    style: &RenderStyle,
) -> DrawPlan {
    let background = if mode.ambient {
        Background::Black
    } else {
        Background::Interactive
    };
    let mut plan = DrawPlan::new(background, *style);

    plan.push(DrawItem::HourMinute(clock.hour_minute_text()));
    if !mode.ambient {
        plan.push(DrawItem::Seconds(clock.seconds_text()));
        plan.push(DrawItem::Date(clock.date_text()));
    }
    plan.push(DrawItem::Divider);

    if !weather.high.is_empty() {
        plan.push(DrawItem::HighTemperature(weather.high.clone()));
    }
    if !weather.low.is_empty() {
        plan.push(DrawItem::LowTemperature(weather.low.clone()));
    }

    if !mode.ambient {
        if let Some(icon) = &weather.icon {
            plan.push(DrawItem::Icon(icon.clone()));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn clock() -> ClockState {
        ClockState::from_unix_millis(1_792_155_909_000, 0).unwrap()
    }

    fn weather_with_icon() -> WeatherState {
        let mut weather = WeatherState::new("25°", "16°");
        weather.icon = Some(DecodedImage::new(8, 1, vec![0xff]).unwrap());
        weather
    }

    fn mode(ambient: bool) -> DisplayMode {
        DisplayMode {
            ambient,
            visible: true,
            low_bit_ambient: false,
        }
    }

    #[test]
    fn interactive_frame_shows_seconds_date_and_icon() {
        let plan = compose_frame(
            &clock(),
            &weather_with_icon(),
            &mode(false),
            &RenderStyle::default(),
        );
        assert_eq!(plan.background, Background::Interactive);
        assert!(plan.has_seconds());
        assert!(plan.has_icon());
        assert!(plan.items.contains(&DrawItem::Date(clock().date_text())));
        assert!(
            plan.items
                .contains(&DrawItem::HighTemperature(Temperature::from("25°")))
        );
    }

    #[test]
    fn ambient_frame_drops_seconds_and_icon_but_keeps_temperatures() {
        let plan = compose_frame(
            &clock(),
            &weather_with_icon(),
            &mode(true),
            &RenderStyle::default(),
        );
        assert_eq!(plan.background, Background::Black);
        assert!(!plan.has_seconds());
        assert!(!plan.has_icon());
        assert!(
            plan.items
                .contains(&DrawItem::LowTemperature(Temperature::from("16°")))
        );
        assert_eq!(plan.items[0], DrawItem::HourMinute(clock().hour_minute_text()));
    }

    #[test]
    fn missing_icon_is_omitted_not_replaced() {
        let plan = compose_frame(
            &clock(),
            &WeatherState::new("25°", "16°"),
            &mode(false),
            &RenderStyle::default(),
        );
        assert!(!plan.has_icon());
        assert_eq!(plan.items.len(), 6);
    }

    #[test]
    fn unknown_temperatures_are_not_drawn() {
        let plan = compose_frame(
            &clock(),
            &WeatherState::default(),
            &mode(true),
            &RenderStyle::default(),
        );
        assert_eq!(
            plan.items.as_slice(),
            &[
                DrawItem::HourMinute(clock().hour_minute_text()),
                DrawItem::Divider
            ]
        );
    }
}
