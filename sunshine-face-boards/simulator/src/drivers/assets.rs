//! 模拟配套设备上的图标资源
//! 资源以 PBM (P4) 存放，取回时解码成 1 bpp 位图

use std::collections::BTreeMap;

use embassy_time::{Duration, Timer};
use sunshine_face_common::*;

pub const SUN_ASSET: &str = "asset://sunny";
pub const CLOUD_ASSET: &str = "asset://cloudy";
/// 内容损坏的资源，用来演示解码失败
pub const BROKEN_ASSET: &str = "asset://broken";

pub struct SimulatedAssets {
    assets: BTreeMap<&'static str, Vec<u8>>,
    latency: Duration,
}

impl SimulatedAssets {
    pub fn new(icon_size: u16, latency: Duration) -> Self {
        let mut assets = BTreeMap::new();
        assets.insert(SUN_ASSET, encode_pbm(icon_size, |x, y, size| {
            let c = size as i32 / 2;
            let (dx, dy) = (x as i32 - c, y as i32 - c);
            let r = size as i32 / 4;
            dx * dx + dy * dy <= r * r || dx == 0 || dy == 0 || dx == dy || dx == -dy
        }));
        assets.insert(CLOUD_ASSET, encode_pbm(icon_size, |x, y, size| {
            let third = size / 3;
            y > third && y < size - third && x > size / 8 && x < size - size / 8
        }));
        assets.insert(BROKEN_ASSET, b"P4\n40".to_vec());

        Self { assets, latency }
    }
}

impl AssetFetcher for SimulatedAssets {
    async fn fetch(&mut self, asset: &AssetRef) -> Result<DecodedImage, FetchError> {
        Timer::after(self.latency).await;
        let blob = self
            .assets
            .get(asset.as_str())
            .ok_or(FetchError::Unreachable)?;
        let image = decode_pbm(blob)?;
        debug!(
            "Fetched {} ({}x{})",
            asset.as_str(),
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

fn encode_pbm(size: u16, lit: impl Fn(u16, u16, u16) -> bool) -> Vec<u8> {
    let stride = (size as usize).div_ceil(8);
    let mut blob = format!("P4\n{size} {size}\n").into_bytes();
    for y in 0..size {
        let mut row = vec![0u8; stride];
        for x in 0..size {
            if lit(x, y, size) {
                row[x as usize / 8] |= 0x80 >> (x % 8);
            }
        }
        blob.extend_from_slice(&row);
    }
    blob
}

/// 解析二进制 PBM：`P4`、宽、高，随后一个空白字节和位图数据
fn decode_pbm(blob: &[u8]) -> Result<DecodedImage, FetchError> {
    let mut cursor = 0;
    let mut header = [0u32; 3];

    for (index, field) in header.iter_mut().enumerate() {
        while blob.get(cursor).is_some_and(|b| b.is_ascii_whitespace()) {
            cursor += 1;
        }
        if blob.get(cursor) == Some(&b'#') {
            while blob.get(cursor).is_some_and(|&b| b != b'\n') {
                cursor += 1;
            }
            while blob.get(cursor).is_some_and(|b| b.is_ascii_whitespace()) {
                cursor += 1;
            }
        }
        let start = cursor;
        while blob.get(cursor).is_some_and(|b| !b.is_ascii_whitespace()) {
            cursor += 1;
        }
        let token = std::str::from_utf8(&blob[start..cursor]).map_err(|_| FetchError::Decode)?;
        *field = if index == 0 {
            if token != "P4" {
                return Err(FetchError::Decode);
            }
            0
        } else {
            token.parse().map_err(|_| FetchError::Decode)?
        };
    }

    // 高度之后恰好一个空白
    if !blob.get(cursor).is_some_and(|b| b.is_ascii_whitespace()) {
        return Err(FetchError::Decode);
    }
    cursor += 1;

    let width = u16::try_from(header[1]).map_err(|_| FetchError::Decode)?;
    let height = u16::try_from(header[2]).map_err(|_| FetchError::Decode)?;
    DecodedImage::new(width, height, blob[cursor..].to_vec())
}
