// 该文件是 Lushao （路哨） 项目的一部分。
// src/labels.rs - 类别标签表与危险类别掩码
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

/// COCO 数据集类别名称
pub const COCO_CLASSES: [&str; 80] = [
  "person",
  "bicycle",
  "car",
  "motorcycle",
  "airplane",
  "bus",
  "train",
  "truck",
  "boat",
  "traffic light",
  "fire hydrant",
  "stop sign",
  "parking meter",
  "bench",
  "bird",
  "cat",
  "dog",
  "horse",
  "sheep",
  "cow",
  "elephant",
  "bear",
  "zebra",
  "giraffe",
  "backpack",
  "umbrella",
  "handbag",
  "tie",
  "suitcase",
  "frisbee",
  "skis",
  "snowboard",
  "sports ball",
  "kite",
  "baseball bat",
  "baseball glove",
  "skateboard",
  "surfboard",
  "tennis racket",
  "bottle",
  "wine glass",
  "cup",
  "fork",
  "knife",
  "spoon",
  "bowl",
  "banana",
  "apple",
  "sandwich",
  "orange",
  "broccoli",
  "carrot",
  "hot dog",
  "pizza",
  "donut",
  "cake",
  "chair",
  "couch",
  "potted plant",
  "bed",
  "dining table",
  "toilet",
  "tv",
  "laptop",
  "mouse",
  "remote",
  "keyboard",
  "cell phone",
  "microwave",
  "oven",
  "toaster",
  "sink",
  "refrigerator",
  "book",
  "clock",
  "vase",
  "scissors",
  "teddy bear",
  "hair drier",
  "toothbrush",
];

/// 类别总数
pub const NUM_CLASSES: usize = COCO_CLASSES.len();

/// 根据类别索引查找类别名称，越界时返回 "unknown"
pub fn class_name(class_id: u32) -> &'static str {
  COCO_CLASSES
    .get(class_id as usize)
    .copied()
    .unwrap_or("unknown")
}

/// 不可变的类别集合，以位掩码表示，支持常量构造
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassMask(u128);

impl ClassMask {
  pub const EMPTY: ClassMask = ClassMask(0);

  /// 由类别索引列表构造掩码，索引必须小于 128
  pub const fn from_ids(ids: &[u32]) -> Self {
    let mut bits = 0u128;
    let mut i = 0;
    while i < ids.len() {
      bits |= 1u128 << ids[i];
      i += 1;
    }
    ClassMask(bits)
  }

  pub const fn contains(&self, class_id: u32) -> bool {
    class_id < 128 && (self.0 >> class_id) & 1 == 1
  }
}

/// 危险类别集合：行人与各类车辆
pub const DANGER_CLASSES: ClassMask = ClassMask::from_ids(&[0, 1, 2, 3, 5, 7]);
