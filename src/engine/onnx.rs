// 该文件是 Lushao （路哨） 项目的一部分。
// src/engine/onnx.rs - ONNX Runtime 推理引擎
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use tracing::{debug, error, info};

use crate::engine::{Engine, EngineError, INPUT_SIZE, InputFrame, RawOutput};

const ONNX_NUM_INPUTS: usize = 1;
const DEFAULT_INTRA_THREADS: usize = 4;

pub struct OnnxEngineBuilder {
  model_path: PathBuf,
  intra_threads: usize,
}

impl OnnxEngineBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    OnnxEngineBuilder {
      model_path: model_path.into(),
      intra_threads: DEFAULT_INTRA_THREADS,
    }
  }

  pub fn intra_threads(mut self, intra_threads: usize) -> Self {
    self.intra_threads = intra_threads;
    self
  }

  pub fn build(self) -> Result<OnnxEngine, EngineError> {
    info!("加载模型文件: {}", self.model_path.display());
    let session = Session::builder()
      .map_err(EngineError::ModelLoad)?
      .with_optimization_level(GraphOptimizationLevel::Level3)
      .map_err(EngineError::ModelLoad)?
      .with_intra_threads(self.intra_threads)
      .map_err(EngineError::ModelLoad)?
      .commit_from_file(&self.model_path)
      .map_err(EngineError::ModelLoad)?;
    info!("模型加载完成");

    if session.inputs.len() != ONNX_NUM_INPUTS {
      error!(
        "预期模型输入数量为 {}, 实际为 {}",
        ONNX_NUM_INPUTS,
        session.inputs.len()
      );
      return Err(EngineError::ModelInvalid(format!(
        "预期模型输入数量为 {}, 实际为 {}",
        ONNX_NUM_INPUTS,
        session.inputs.len()
      )));
    }

    if session.outputs.is_empty() {
      error!("模型没有输出张量");
      return Err(EngineError::ModelInvalid("模型没有输出张量".to_string()));
    }

    let input_name = session.inputs[0].name.clone();
    let output_name = session.outputs[0].name.clone();
    debug!("模型输入名称: {}", input_name);
    debug!("模型首个输出名称: {}", output_name);
    debug!("模型输出数量: {}", session.outputs.len());

    Ok(OnnxEngine {
      session: Mutex::new(session),
      input_name,
      output_name,
    })
  }
}

/// 基于 ONNX Runtime 的推理引擎。
/// 会话仅支持串行调用，互斥锁在引擎内部完成排队。
pub struct OnnxEngine {
  session: Mutex<Session>,
  input_name: String,
  output_name: String,
}

impl Engine for OnnxEngine {
  fn infer(&self, input: &InputFrame) -> Result<RawOutput, EngineError> {
    let size = INPUT_SIZE as usize;
    let array = Array4::from_shape_vec((1, 3, size, size), input.as_nchw().to_vec())
      .map_err(|e| EngineError::Runtime(format!("输入张量整形失败: {}", e)))?;
    let tensor = Value::from_array(array).map_err(EngineError::Inference)?;

    debug!("执行模型推理");
    let mut session = self
      .session
      .lock()
      .map_err(|e| EngineError::Runtime(format!("会话锁不可用: {}", e)))?;
    let outputs = session
      .run(ort::inputs![self.input_name.as_str() => tensor])
      .map_err(EngineError::Inference)?;

    debug!("获取模型输出");
    let first = outputs
      .get(self.output_name.as_str())
      .ok_or_else(|| EngineError::InvalidOutput("模型没有返回任何输出".to_string()))?;

    let (shape, data) = first
      .try_extract_tensor::<f32>()
      .map_err(|e| EngineError::InvalidOutput(format!("无法提取输出张量: {}", e)))?;

    if shape.len() != 3 || shape[0] != 1 || shape[1] <= 0 || shape[2] <= 0 {
      error!("预期输出形状为 [1, C, N], 实际为 {:?}", shape);
      return Err(EngineError::InvalidOutput(format!(
        "预期输出形状为 [1, C, N], 实际为 {:?}",
        shape
      )));
    }

    let channels = shape[1] as usize;
    let anchors = shape[2] as usize;

    Ok(RawOutput::new(channels, anchors, data.to_vec()))
  }
}
