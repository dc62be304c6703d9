//! 天气同步服务
//!
//! `SyncSession` 是纯状态机：连接状态、会话代号、待完成的取图请求，以及天气的唯一写端。
//! `SyncService` 把它接到配套设备连接和各个通道上，在自己的任务里运行。
//!
//! 连接状态：`Disconnected -> Connecting -> Connected -> Disconnected`。
//! 每个可见周期一个会话，隐藏时强制断开，代号前进，之前发出的取图结果全部作废。

use core::pin::pin;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_futures::select::{Either, Either3, select, select3};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};
use sunshine_face_common::weather::WeatherPayload;
use sunshine_face_common::*;

use crate::services::weather_store::WeatherWriter;

/// 会话代号，在同步服务和取图任务之间共享
pub struct SessionGeneration {
    current: AtomicU32,
    cancelled: Signal<FaceRawMutex, u32>,
}

impl SessionGeneration {
    pub const fn new() -> Self {
        Self {
            current: AtomicU32::new(0),
            cancelled: Signal::new(),
        }
    }

    pub fn current(&self) -> u32 {
        self.current.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u32) -> bool {
        self.current() == generation
    }

    /// 取图开始前调用：清掉旧的取消信号，再确认请求仍属于当前会话
    pub fn begin_fetch(&self, generation: u32) -> bool {
        self.cancelled.reset();
        self.is_current(generation)
    }

    /// 代号前进后返回
    pub async fn cancelled(&self) {
        self.cancelled.wait().await;
    }

    fn advance(&self) -> u32 {
        let next = self.current.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.cancelled.signal(next);
        next
    }
}

impl Default for SessionGeneration {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingFetch {
    generation: u32,
    ticket: u32,
    payload: WeatherPayload,
}

pub struct SyncSession<'a> {
    state: ConnectionState,
    generation: &'a SessionGeneration,
    next_ticket: u32,
    pending: Option<PendingFetch>,
    weather: WeatherWriter<'a>,
    weather_path: DataPath,
}

impl<'a> SyncSession<'a> {
    pub fn new(
        weather: WeatherWriter<'a>,
        generation: &'a SessionGeneration,
        config: &SyncConfig,
    ) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            generation,
            next_ticket: 0,
            pending: None,
            weather,
            weather_path: config.weather_path.clone(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn generation(&self) -> u32 {
        self.generation.current()
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.pending.is_some()
    }

    pub fn weather(&self) -> WeatherState {
        self.weather.current()
    }

    /// `Disconnected -> Connecting`，返回新会话的代号
    pub fn begin_connect(&mut self) -> Option<u32> {
        if self.state != ConnectionState::Disconnected {
            warn!("Connect requested while {:?}, ignoring", self.state);
            return None;
        }
        self.state = ConnectionState::Connecting;
        Some(self.generation.advance())
    }

    /// 连接和监听器注册都成功后调用
    pub fn connect_succeeded(&mut self, generation: u32) -> bool {
        if self.state != ConnectionState::Connecting || !self.generation.is_current(generation) {
            return false;
        }
        self.state = ConnectionState::Connected;
        true
    }

    /// 连接失败不重试，保留上一次的天气
    pub fn connect_failed(&mut self, generation: u32, error: SyncError) {
        if self.generation.is_current(generation) && self.state == ConnectionState::Connecting {
            warn!("Connection to companion failed: {:?}", error);
            self.state = ConnectionState::Disconnected;
        }
    }

    /// 任意状态强制断开，返回调用方是否需要注销监听器
    pub fn teardown(&mut self) -> bool {
        if self.state == ConnectionState::Disconnected {
            return false;
        }
        let had_listener = self.state == ConnectionState::Connected;
        self.state = ConnectionState::Disconnected;
        self.pending = None;
        self.generation.advance();
        had_listener
    }

    /// 处理一批变更通知，必须尽快返回
    ///
    /// 同一批里多个有效负载时只保留最后一个，只发出一个取图请求。
    pub fn on_data_changed(&mut self, batch: &[DataEvent]) -> Option<FetchRequest> {
        if self.state != ConnectionState::Connected {
            debug!("Dropping batch of {} events, no listener", batch.len());
            return None;
        }

        let mut accepted = false;
        for event in batch {
            if event.kind != DataEventKind::Changed {
                continue;
            }
            if event.path != self.weather_path {
                continue;
            }

            let payload = match WeatherPayload::decode(&event.payload) {
                Ok(payload) => payload,
                Err(e) => {
                    debug!("Dropping malformed weather payload: {:?}", e);
                    continue;
                }
            };

            if !self.is_new(&payload) {
                debug!(
                    "Weather unchanged ({} / {}), skipping fetch",
                    payload.high.as_str(),
                    payload.low.as_str()
                );
                continue;
            }

            self.next_ticket = self.next_ticket.wrapping_add(1);
            self.pending = Some(PendingFetch {
                generation: self.generation.current(),
                ticket: self.next_ticket,
                payload,
            });
            accepted = true;
        }

        if !accepted {
            return None;
        }
        self.pending.as_ref().map(|pending| FetchRequest {
            generation: pending.generation,
            ticket: pending.ticket,
            asset: pending.payload.icon.clone(),
        })
    }

    /// 取图请求没能送出时放弃对应的待定数据
    pub fn abandon_fetch(&mut self, ticket: u32) {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            self.pending = None;
        }
    }

    /// 取图完成：校验代号和票据，然后整体替换天气
    pub fn on_fetch_complete(&mut self, completion: FetchCompletion) -> FetchOutcome {
        if self.state != ConnectionState::Connected
            || !self.generation.is_current(completion.generation)
        {
            debug!(
                "Discarding fetch result from generation {}",
                completion.generation
            );
            return FetchOutcome::Stale;
        }

        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == completion.ticket => pending,
            other => {
                self.pending = other;
                debug!("Discarding superseded fetch result {}", completion.ticket);
                return FetchOutcome::Stale;
            }
        };

        let icon = match completion.icon {
            Ok(icon) => icon,
            Err(FetchError::Decode) => {
                warn!("Weather icon could not be decoded, showing temperatures only");
                None
            }
            Err(e) => {
                warn!("Weather icon fetch failed, keeping last weather: {:?}", e);
                return FetchOutcome::Failed(e);
            }
        };

        info!(
            "Weather updated: high={} low={} icon={}",
            pending.payload.high.as_str(),
            pending.payload.low.as_str(),
            icon.is_some()
        );
        self.weather.replace(WeatherState {
            high: pending.payload.high,
            low: pending.payload.low,
            icon,
        });
        FetchOutcome::Applied
    }

    fn is_new(&self, payload: &WeatherPayload) -> bool {
        match &self.pending {
            Some(pending) => {
                !eq_ignore_case(&payload.high, &pending.payload.high)
                    || !eq_ignore_case(&payload.low, &pending.payload.low)
            }
            None => self.weather.current().accepts(&payload.high, &payload.low),
        }
    }
}

/// 同步服务用到的通道端
pub struct SyncEndpoints<'a> {
    pub control: FaceChannelReceiver<'a, SyncControl>,
    pub batches: FaceChannelReceiver<'a, DataEventBatch>,
    pub completions: FaceChannelReceiver<'a, FetchCompletion>,
    pub requests: FaceChannelSender<'a, FetchRequest>,
    pub face_events: FaceChannelSender<'a, FaceEvent>,
}

pub struct SyncService<'a, L: CompanionLink> {
    session: SyncSession<'a>,
    link: L,
    connect_timeout: Duration,
    endpoints: SyncEndpoints<'a>,
}

impl<'a, L: CompanionLink> SyncService<'a, L> {
    pub fn new(
        session: SyncSession<'a>,
        link: L,
        config: &SyncConfig,
        endpoints: SyncEndpoints<'a>,
    ) -> Self {
        Self {
            session,
            link,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms as u64),
            endpoints,
        }
    }

    pub fn session(&self) -> &SyncSession<'a> {
        &self.session
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub async fn run(&mut self) -> ! {
        info!("Sync service started");
        loop {
            self.step().await;
        }
    }

    /// 处理一个输入：控制命令、通知批次或取图结果
    pub async fn step(&mut self) {
        let input = select3(
            self.endpoints.control.receive(),
            self.endpoints.batches.receive(),
            self.endpoints.completions.receive(),
        )
        .await;

        match input {
            Either3::First(control) => self.handle_control(control).await,
            Either3::Second(batch) => self.handle_batch(&batch),
            Either3::Third(completion) => self.handle_completion(completion),
        }
    }

    pub async fn handle_control(&mut self, control: SyncControl) {
        match control {
            SyncControl::Connect => self.connect().await,
            SyncControl::Disconnect => self.disconnect().await,
        }
    }

    pub fn handle_batch(&mut self, batch: &[DataEvent]) {
        debug!("New data received: {} events", batch.len());
        if let Some(request) = self.session.on_data_changed(batch) {
            let ticket = request.ticket;
            if self.endpoints.requests.try_send(request).is_err() {
                warn!("Fetch queue full, dropping weather update");
                self.session.abandon_fetch(ticket);
            }
        }
    }

    pub fn handle_completion(&mut self, completion: FetchCompletion) {
        if self.session.on_fetch_complete(completion) == FetchOutcome::Applied
            && self
                .endpoints
                .face_events
                .try_send(FaceEvent::WeatherUpdated)
                .is_err()
        {
            warn!("Face event queue full, weather redraw deferred");
        }
    }

    async fn connect(&mut self) {
        let Some(generation) = self.session.begin_connect() else {
            return;
        };
        info!("Connecting to companion (generation {})", generation);

        // 连接期间仍要响应断开命令，不能让隐藏等待连接超时
        let result = {
            let mut attempt = pin!(with_timeout(self.connect_timeout, self.link.connect()));
            loop {
                match select(attempt.as_mut(), self.endpoints.control.receive()).await {
                    Either::First(result) => break Some(result),
                    Either::Second(SyncControl::Disconnect) => break None,
                    Either::Second(SyncControl::Connect) => debug!("Already connecting"),
                }
            }
        };

        match result {
            None => {
                info!("Disconnect requested while connecting");
                self.session.teardown();
                self.link.disconnect().await;
            }
            Some(Err(_)) => {
                self.session
                    .connect_failed(generation, SyncError::ConnectTimeout);
                self.link.disconnect().await;
            }
            Some(Ok(Err(e))) => {
                self.session.connect_failed(generation, e);
                self.link.disconnect().await;
            }
            Some(Ok(Ok(()))) => match self.link.add_listener().await {
                Ok(()) => {
                    if self.session.connect_succeeded(generation) {
                        info!("Connected to companion, data listener registered");
                    }
                }
                Err(e) => {
                    self.session.connect_failed(generation, e);
                    self.link.disconnect().await;
                }
            },
        }
    }

    async fn disconnect(&mut self) {
        if self.session.state() == ConnectionState::Disconnected {
            debug!("Already disconnected");
            return;
        }
        if self.session.teardown() {
            self.link.remove_listener().await;
        }
        self.link.disconnect().await;
        info!("Disconnected from companion");
    }
}
