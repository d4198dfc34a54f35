// 该文件是 Lushao （路哨） 项目的一部分。
// src/detector/nms.rs - 非极大值抑制
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use crate::detector::Detection;

/// 贪心非极大值抑制，跨类别比较。
///
/// 先按置信度降序稳定排序（同分保持锚点顺序），随后反复取出剩余
/// 集合中置信度最高者，剔除与其 IoU 达到阈值的所有检测。
/// 输出按置信度降序，任意两个保留框之间的 IoU 严格小于阈值。
pub fn suppress(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
  detections.sort_by(|a, b| {
    b.confidence
      .partial_cmp(&a.confidence)
      .unwrap_or(std::cmp::Ordering::Equal)
  });

  let mut accepted = Vec::new();

  while !detections.is_empty() {
    let best = detections.remove(0);
    detections.retain(|det| iou(&best.bbox, &det.bbox) < iou_threshold);
    accepted.push(best);
  }

  accepted
}

/// 两个角点格式框的交并比；不相交或并集为零时为 0
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
  let x1 = a[0].max(b[0]);
  let y1 = a[1].max(b[1]);
  let x2 = a[2].min(b[2]);
  let y2 = a[3].min(b[3]);

  if x2 < x1 || y2 < y1 {
    return 0.0;
  }

  let intersection = (x2 - x1) * (y2 - y1);
  let area_a = (a[2] - a[0]) * (a[3] - a[1]);
  let area_b = (b[2] - b[0]) * (b[3] - b[1]);
  let union = area_a + area_b - intersection;

  if union > 0.0 { intersection / union } else { 0.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detection(confidence: f32, bbox: [f32; 4]) -> Detection {
    Detection {
      class_id: 0,
      class_name: "person",
      confidence,
      bbox,
    }
  }

  #[test]
  fn iou_of_box_with_itself_is_one() {
    let bbox = [0.1, 0.1, 0.5, 0.5];
    assert!((iou(&bbox, &bbox) - 1.0).abs() < 1e-6);
  }

  #[test]
  fn iou_of_disjoint_boxes_is_zero() {
    let a = [0.0, 0.0, 0.2, 0.2];
    let b = [0.5, 0.5, 0.7, 0.7];
    assert_eq!(iou(&a, &b), 0.0);
  }

  #[test]
  fn iou_of_zero_area_box_is_zero() {
    let a = [0.3, 0.3, 0.3, 0.3];
    assert_eq!(iou(&a, &a), 0.0);
  }

  #[test]
  fn suppresses_overlapping_lower_confidence() {
    // 两个高度重叠的 person 框，IoU 远超阈值，只保留 0.9 的那个
    let detections = vec![
      detection(0.6, [0.15, 0.0, 0.55, 0.4]),
      detection(0.9, [0.1, 0.0, 0.5, 0.4]),
    ];
    let kept = suppress(detections, 0.45);
    assert_eq!(kept.len(), 1);
    assert!((kept[0].confidence - 0.9).abs() < 1e-6);
  }

  #[test]
  fn keeps_non_overlapping_sorted_by_confidence() {
    let detections = vec![
      detection(0.55, [0.0, 0.0, 0.1, 0.1]),
      detection(0.95, [0.5, 0.5, 0.6, 0.6]),
      detection(0.7, [0.8, 0.0, 0.9, 0.1]),
    ];
    let kept = suppress(detections, 0.45);
    let scores: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
    assert_eq!(scores, vec![0.95, 0.7, 0.55]);
  }

  #[test]
  fn retained_pairs_stay_under_threshold() {
    let detections = vec![
      detection(0.9, [0.0, 0.0, 0.4, 0.4]),
      detection(0.8, [0.1, 0.1, 0.5, 0.5]),
      detection(0.7, [0.35, 0.35, 0.75, 0.75]),
      detection(0.6, [0.6, 0.6, 1.0, 1.0]),
    ];
    let kept = suppress(detections, 0.45);
    for i in 0..kept.len() {
      for j in (i + 1)..kept.len() {
        assert!(iou(&kept[i].bbox, &kept[j].bbox) < 0.45);
      }
    }
  }

  #[test]
  fn suppression_is_idempotent() {
    let detections = vec![
      detection(0.9, [0.0, 0.0, 0.4, 0.4]),
      detection(0.8, [0.1, 0.1, 0.5, 0.5]),
      detection(0.6, [0.6, 0.6, 1.0, 1.0]),
    ];
    let once = suppress(detections, 0.45);
    let twice = suppress(once.clone(), 0.45);
    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(twice.iter()) {
      assert_eq!(a.bbox, b.bbox);
    }
  }

  #[test]
  fn equal_confidence_keeps_input_order() {
    // 互不重叠的同分检测应保持原有顺序
    let detections = vec![
      detection(0.8, [0.0, 0.0, 0.1, 0.1]),
      detection(0.8, [0.5, 0.5, 0.6, 0.6]),
    ];
    let kept = suppress(detections, 0.45);
    assert_eq!(kept[0].bbox, [0.0, 0.0, 0.1, 0.1]);
    assert_eq!(kept[1].bbox, [0.5, 0.5, 0.6, 0.6]);
  }

  #[test]
  fn cross_class_suppression() {
    // NMS 不区分类别，高度重叠的不同类别框同样会被剔除
    let mut car = detection(0.7, [0.1, 0.1, 0.5, 0.5]);
    car.class_id = 2;
    car.class_name = "car";
    let detections = vec![detection(0.9, [0.1, 0.1, 0.5, 0.5]), car];
    let kept = suppress(detections, 0.45);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].class_name, "person");
  }
}
