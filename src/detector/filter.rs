// 该文件是 Lushao （路哨） 项目的一部分。
// src/detector/filter.rs - 置信度与危险类别过滤
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use crate::detector::{Candidate, Detection};
use crate::labels::{self, ClassMask};

/// 过滤候选并转换边界框表示。
///
/// 先按置信度再按危险类别丢弃候选；存活者由中心-尺寸格式转为
/// 归一化角点格式，逐坐标截断到 [0, 1]。截断后仍保证 x1 ≤ x2 且
/// y1 ≤ y2，完全越界的退化框压缩为零面积。输出保持锚点顺序。
pub fn filter_candidates(
  candidates: Vec<Candidate>,
  confidence_threshold: f32,
  danger_classes: ClassMask,
  input_size: f32,
) -> Vec<Detection> {
  let mut detections = Vec::new();

  for candidate in candidates {
    if candidate.confidence < confidence_threshold {
      continue;
    }
    if !danger_classes.contains(candidate.class_id) {
      continue;
    }

    let x1 = ((candidate.cx - candidate.w / 2.0) / input_size).clamp(0.0, 1.0);
    let y1 = ((candidate.cy - candidate.h / 2.0) / input_size).clamp(0.0, 1.0);
    let mut x2 = ((candidate.cx + candidate.w / 2.0) / input_size).clamp(0.0, 1.0);
    let mut y2 = ((candidate.cy + candidate.h / 2.0) / input_size).clamp(0.0, 1.0);

    if x2 < x1 {
      x2 = x1;
    }
    if y2 < y1 {
      y2 = y1;
    }

    detections.push(Detection {
      class_id: candidate.class_id,
      class_name: labels::class_name(candidate.class_id),
      confidence: candidate.confidence,
      bbox: [x1, y1, x2, y2],
    });
  }

  detections
}
