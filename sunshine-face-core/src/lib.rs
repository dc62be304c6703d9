#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod managers;
pub mod services;

pub use managers::{FaceManager, RenderScheduler, TimerCommand};
pub use services::{
    FetchService, SessionGeneration, SyncEndpoints, SyncService, SyncSession, TimeService,
    WeatherReader, WeatherStore, WeatherWriter, compose_frame,
};
