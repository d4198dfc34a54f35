// 该文件是 Lushao （路哨） 项目的一部分。
// src/detector.rs - 危险目标检测管线
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::engine::{Engine, EngineError, INPUT_SIZE, OnnxEngine, OnnxEngineBuilder};
use crate::labels::{ClassMask, DANGER_CLASSES};
use crate::preprocess::{self, PreprocessError, PreprocessedFrame};

pub mod decode;
pub mod filter;
pub mod nms;

pub use self::decode::Candidate;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// 最终检测结果，边界框为 [0,1] 归一化的角点格式
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
  pub class_id: u32,
  pub class_name: &'static str,
  pub confidence: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]
}

#[derive(Error, Debug)]
pub enum PostprocessError {
  #[error("输出形状不匹配: 期望通道数 {expected}, 实际为 {actual}")]
  ShapeMismatch { expected: usize, actual: usize },
}

// NotReady 与 Preprocess 的文案是移动端调用方约定的固定字符串
#[derive(Error, Debug)]
pub enum DetectError {
  #[error("Model not loaded")]
  NotReady,
  #[error("Preprocessing failed")]
  Preprocess(#[from] PreprocessError),
  #[error(transparent)]
  Inference(#[from] EngineError),
  #[error("后处理错误: {0}")]
  Postprocess(#[from] PostprocessError),
}

/// 检测管线配置
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
  /// 置信度阈值
  pub confidence_threshold: f32,
  /// NMS IOU 阈值
  pub iou_threshold: f32,
  /// 危险类别集合
  pub danger_classes: ClassMask,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    DetectorConfig {
      confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      danger_classes: DANGER_CLASSES,
    }
  }
}

/// 模型加载应答
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
  pub success: bool,
}

/// 单帧检测应答，对应移动端的 JSON 契约
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DetectResponse {
  Success {
    success: bool,
    detections: Vec<Detection>,
    count: usize,
  },
  Failure {
    error: String,
  },
}

impl DetectResponse {
  fn success(detections: Vec<Detection>) -> Self {
    let count = detections.len();
    DetectResponse::Success {
      success: true,
      detections,
      count,
    }
  }

  fn failure(error: &DetectError) -> Self {
    DetectResponse::Failure {
      error: error.to_string(),
    }
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }
}

/// 危险目标检测管线。
///
/// 生命周期为 `未就绪 --load/attach_engine--> 就绪`，引擎句柄在装入后只读；
/// 每次 `detect` 相互独立，管线不做重试也不做跨帧缓存。
pub struct HazardDetector<E = OnnxEngine> {
  engine: Option<E>,
  config: DetectorConfig,
}

impl<E> HazardDetector<E> {
  pub fn new() -> Self {
    Self::with_config(DetectorConfig::default())
  }

  pub fn with_config(config: DetectorConfig) -> Self {
    HazardDetector {
      engine: None,
      config,
    }
  }

  pub fn is_ready(&self) -> bool {
    self.engine.is_some()
  }

  pub fn config(&self) -> &DetectorConfig {
    &self.config
  }

  /// 装入已构建的推理引擎，管线进入就绪状态
  pub fn attach_engine(&mut self, engine: E) {
    self.engine = Some(engine);
  }
}

impl<E> Default for HazardDetector<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl HazardDetector<OnnxEngine> {
  /// 加载 ONNX 模型；失败时管线保持未就绪状态
  pub fn load(&mut self, model_path: &str) -> Result<(), EngineError> {
    let engine = OnnxEngineBuilder::new(model_path).build()?;
    self.attach_engine(engine);
    Ok(())
  }

  /// 加载模型并给出外部契约格式的应答
  pub fn load_response(&mut self, model_path: &str) -> LoadResponse {
    match self.load(model_path) {
      Ok(()) => LoadResponse { success: true },
      Err(e) => {
        error!("模型加载失败: {}", e);
        LoadResponse { success: false }
      }
    }
  }
}

impl<E: Engine> HazardDetector<E> {
  /// 单帧检测：预处理 → 推理 → 解码 → 过滤 → NMS。
  /// 每个阶段的失败都以带类型的错误上抛，在这里汇合一次。
  pub fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, DetectError> {
    let engine = self.engine.as_ref().ok_or(DetectError::NotReady)?;

    let frame: PreprocessedFrame<INPUT_SIZE> = preprocess::preprocess(image)?;
    let output = engine.infer(&frame.tensor)?;

    let candidates = decode::decode_output(&output)?;
    let detections = filter::filter_candidates(
      candidates,
      self.config.confidence_threshold,
      self.config.danger_classes,
      INPUT_SIZE as f32,
    );
    let detections = nms::suppress(detections, self.config.iou_threshold);

    debug!("检测到 {} 个危险目标", detections.len());
    Ok(detections)
  }

  /// 外部契约层：任何阶段的失败都收敛为结构化应答，不向调用方抛出。
  /// 后处理异常按约定退化为空结果。
  pub fn process_frame(&self, image: &[u8]) -> DetectResponse {
    match self.detect(image) {
      Ok(detections) => DetectResponse::success(detections),
      Err(DetectError::Postprocess(e)) => {
        warn!("后处理异常，按空结果返回: {}", e);
        DetectResponse::success(Vec::new())
      }
      Err(e) => {
        error!("检测失败: {}", e);
        DetectResponse::failure(&e)
      }
    }
  }
}
