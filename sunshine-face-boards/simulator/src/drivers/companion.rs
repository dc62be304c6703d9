//! 模拟配套设备
//!
//! 连接有固定延迟；注册监听器后由广播任务按脚本推送变更通知，
//! 其中包括重复、格式错误和指向坏资源的数据，用来走一遍各条丢弃路径。

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::{Duration, Timer};
use sunshine_face_common::weather::WeatherMap;
use sunshine_face_common::*;

use super::assets::{BROKEN_ASSET, CLOUD_ASSET, SUN_ASSET};

static LISTENING: AtomicBool = AtomicBool::new(false);

pub struct SimulatedCompanion {
    latency: Duration,
    reachable: bool,
    connected: bool,
}

impl SimulatedCompanion {
    pub fn new(latency: Duration, reachable: bool) -> Self {
        Self {
            latency,
            reachable,
            connected: false,
        }
    }
}

impl CompanionLink for SimulatedCompanion {
    async fn connect(&mut self) -> Result<(), SyncError> {
        Timer::after(self.latency).await;
        if !self.reachable {
            return Err(SyncError::ConnectFailed);
        }
        self.connected = true;
        info!("Companion link up");
        Ok(())
    }

    async fn add_listener(&mut self) -> Result<(), SyncError> {
        if !self.connected {
            return Err(SyncError::ListenerRejected);
        }
        LISTENING.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_listener(&mut self) {
        LISTENING.store(false, Ordering::SeqCst);
    }

    async fn disconnect(&mut self) {
        LISTENING.store(false, Ordering::SeqCst);
        if self.connected {
            info!("Companion link down");
        }
        self.connected = false;
    }
}

fn weather_event(path: &str, high: &str, low: &str, icon: Option<&str>) -> DataEvent {
    let map = WeatherMap {
        highest_temperature: Some(Temperature::from(high)),
        lowest_temperature: Some(Temperature::from(low)),
        weather_icon: icon.and_then(|icon| AssetRef::try_from(icon).ok()),
    };
    let payload = serde_json::to_vec(&map).unwrap_or_default();
    DataEvent::changed(path, &payload)
}

fn script(path: &str) -> Vec<DataEventBatch> {
    vec![
        vec![weather_event(path, "25°C", "16°C", Some(SUN_ASSET))],
        // 仅大小写不同，应被去重
        vec![weather_event(path, "25°c", "16°c", Some(CLOUD_ASSET))],
        vec![
            DataEvent::changed(path, b"{not json"),
            DataEvent::deleted(path),
            weather_event("/forecast", "1°", "0°", None),
            weather_event(path, "27°", "18°", Some(CLOUD_ASSET)),
        ],
        vec![weather_event(path, "22°", "", Some(SUN_ASSET))],
        vec![weather_event(path, "19°", "12°", Some(BROKEN_ASSET))],
        vec![weather_event(path, "30°", "21°", Some("asset://missing"))],
        vec![weather_event(path, "21°", "13°", None)],
    ]
}

/// 监听器注册期间，每隔一段时间推送脚本中的下一批通知
pub async fn broadcast_task(
    batches: FaceChannelSender<'_, DataEventBatch>,
    path: &str,
    period: Duration,
) -> ! {
    let script = script(path);
    let mut next = 0;

    loop {
        Timer::after(period).await;
        if !LISTENING.load(Ordering::SeqCst) {
            continue;
        }
        let batch = script[next % script.len()].clone();
        next += 1;
        info!("Companion broadcasting {} events", batch.len());
        batches.send(batch).await;
    }
}
