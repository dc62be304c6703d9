//! 取图任务
//!
//! 在通知投递路径之外解析图标引用。请求所属会话已经结束时直接跳过，
//! 进行中的取图在会话代号前进时被取消。

use embassy_futures::select::{Either, select};
use sunshine_face_common::*;

use crate::services::sync_service::SessionGeneration;

pub struct FetchService<'a, F: AssetFetcher> {
    fetcher: F,
    generation: &'a SessionGeneration,
    requests: FaceChannelReceiver<'a, FetchRequest>,
    completions: FaceChannelSender<'a, FetchCompletion>,
}

impl<'a, F: AssetFetcher> FetchService<'a, F> {
    pub fn new(
        fetcher: F,
        generation: &'a SessionGeneration,
        requests: FaceChannelReceiver<'a, FetchRequest>,
        completions: FaceChannelSender<'a, FetchCompletion>,
    ) -> Self {
        Self {
            fetcher,
            generation,
            requests,
            completions,
        }
    }

    pub async fn run(&mut self) -> ! {
        info!("Fetch worker started");
        loop {
            let request = self.requests.receive().await;
            self.handle(request).await;
        }
    }

    pub async fn handle(&mut self, request: FetchRequest) {
        if !self.generation.begin_fetch(request.generation) {
            debug!("Skipping fetch for ended session {}", request.generation);
            return;
        }

        let icon = match &request.asset {
            None => Ok(None),
            Some(asset) => {
                match select(self.fetcher.fetch(asset), self.generation.cancelled()).await {
                    Either::First(result) => result.map(Some),
                    Either::Second(()) => {
                        debug!("Fetch for ticket {} cancelled", request.ticket);
                        return;
                    }
                }
            }
        };

        self.completions
            .send(FetchCompletion {
                generation: request.generation,
                ticket: request.ticket,
                icon,
            })
            .await;
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}
