//! 天气状态存储
//!
//! 同步侧唯一写入，渲染侧只读。每次写入整体替换，读取拿到的是完整快照。

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use sunshine_face_common::*;

pub struct WeatherStore {
    state: Mutex<FaceRawMutex, RefCell<WeatherState>>,
    version: AtomicU32,
}

impl WeatherStore {
    pub fn new(initial: WeatherState) -> Self {
        Self {
            state: Mutex::new(RefCell::new(initial)),
            version: AtomicU32::new(0),
        }
    }

    /// 拆成一个写端和一个可复制的读端
    pub fn split(&mut self) -> (WeatherWriter<'_>, WeatherReader<'_>) {
        let store = &*self;
        (WeatherWriter { store }, WeatherReader { store })
    }

    fn snapshot(&self) -> WeatherState {
        self.state.lock(|cell| cell.borrow().clone())
    }
}

#[derive(Clone, Copy)]
pub struct WeatherReader<'a> {
    store: &'a WeatherStore,
}

impl WeatherReader<'_> {
    pub fn snapshot(&self) -> WeatherState {
        self.store.snapshot()
    }

    /// 每次替换加一
    pub fn version(&self) -> u32 {
        self.store.version.load(Ordering::Acquire)
    }
}

pub struct WeatherWriter<'a> {
    store: &'a WeatherStore,
}

impl WeatherWriter<'_> {
    pub fn current(&self) -> WeatherState {
        self.store.snapshot()
    }

    pub fn replace(&mut self, state: WeatherState) {
        self.store.state.lock(|cell| {
            cell.replace(state);
        });
        self.store.version.fetch_add(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_sees_whole_replacement() {
        let mut store = WeatherStore::new(WeatherState::new("20°", "16°"));
        let (mut writer, reader) = store.split();
        assert_eq!(reader.version(), 0);

        writer.replace(WeatherState::new("25°", "11°"));

        let snapshot = reader.snapshot();
        assert_eq!(snapshot.high.as_str(), "25°");
        assert_eq!(snapshot.low.as_str(), "11°");
        assert_eq!(reader.version(), 1);
        assert_eq!(writer.current(), snapshot);
    }
}
