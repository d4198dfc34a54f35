// 该文件是 Lushao （路哨） 项目的一部分。
// src/detector/decode.rs - 原始输出解码
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use tracing::debug;

use crate::detector::PostprocessError;
use crate::engine::RawOutput;
use crate::labels::NUM_CLASSES;

/// 每个锚点中边界框参数所占的通道数
const BOX_CHANNELS: usize = 4;

/// 单个锚点的候选记录，边界框为中心-尺寸格式（张量像素单位）
#[derive(Debug, Clone)]
pub struct Candidate {
  pub class_id: u32,
  pub confidence: f32,
  pub cx: f32,
  pub cy: f32,
  pub w: f32,
  pub h: f32,
}

/// 把 [1, 4+C, N] 的原始输出按锚点展开为候选序列。
///
/// 每个锚点取分数最大的类别作为唯一标签；分数相等时保留较小的类别索引。
/// 此处不做任何过滤，输出数量等于锚点数量。
pub fn decode_output(output: &RawOutput) -> Result<Vec<Candidate>, PostprocessError> {
  let expected = BOX_CHANNELS + NUM_CLASSES;
  if output.channels() != expected {
    return Err(PostprocessError::ShapeMismatch {
      expected,
      actual: output.channels(),
    });
  }

  let anchors = output.anchors();
  let mut candidates = Vec::with_capacity(anchors);

  for anchor in 0..anchors {
    let mut best_score = f32::MIN;
    let mut best_class = 0usize;
    for class in 0..NUM_CLASSES {
      let score = output.value(BOX_CHANNELS + class, anchor);
      if score > best_score {
        best_score = score;
        best_class = class;
      }
    }

    candidates.push(Candidate {
      class_id: best_class as u32,
      confidence: best_score,
      cx: output.value(0, anchor),
      cy: output.value(1, anchor),
      w: output.value(2, anchor),
      h: output.value(3, anchor),
    });
  }

  debug!("解码得到 {} 个候选", candidates.len());
  Ok(candidates)
}
