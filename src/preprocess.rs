// 该文件是 Lushao （路哨） 项目的一部分。
// src/preprocess.rs - 图像预处理
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::io::Cursor;

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::frame::NchwTensor;

const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum PreprocessError {
  #[error("图像解码错误: {0}")]
  Decode(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
}

/// 预处理结果：归一化张量与缩放前的原始图像尺寸。
/// 原始尺寸仅随结果携带，坐标还原交由调用方处理。
#[derive(Debug, Clone)]
pub struct PreprocessedFrame<const S: u32> {
  pub tensor: NchwTensor<S>,
  pub source_width: u32,
  pub source_height: u32,
}

/// 把压缩图像字节解码并整理为推理输入张量。
///
/// 步骤：解码、转为 RGB 三通道、双线性缩放到 S×S（不保留宽高比）、
/// 像素缩放到 [0, 1]、HWC 转 CHW。
pub fn preprocess<const S: u32>(bytes: &[u8]) -> Result<PreprocessedFrame<S>, PreprocessError> {
  let image = ImageReader::new(Cursor::new(bytes))
    .with_guessed_format()?
    .decode()?
    .to_rgb8();

  let (source_width, source_height) = image.dimensions();
  debug!("输入图像尺寸: {}x{}", source_width, source_height);

  let resized = image::imageops::resize(&image, S, S, image::imageops::FilterType::Triangle);

  Ok(PreprocessedFrame {
    tensor: normalize_to_nchw(&resized),
    source_width,
    source_height,
  })
}

/// HWC 字节像素转为 [0, 1] 归一化的 CHW 浮点布局
fn normalize_to_nchw<const S: u32>(image: &RgbImage) -> NchwTensor<S> {
  let size = S as usize;
  let mut data = vec![0.0f32; RGB_CHANNELS * size * size];

  for c in 0..RGB_CHANNELS {
    for h in 0..size {
      for w in 0..size {
        let pixel = image.get_pixel(w as u32, h as u32);
        let index = c * size * size + h * size + w;
        data[index] = pixel[c] as f32 / 255.0;
      }
    }
  }

  NchwTensor::from(data)
}
