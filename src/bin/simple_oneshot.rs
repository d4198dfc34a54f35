// 该文件是 Lushao （路哨） 项目的一部分。
// src/bin/simple_oneshot.rs - 单帧检测测试代码
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use lushao::detector::{DetectResponse, DetectorConfig, HazardDetector};

/// Lushao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型文件路径
  #[arg(long, value_name = "MODEL")]
  pub model: String,

  /// 输入图片路径
  #[arg(long, value_name = "IMAGE")]
  pub image: String,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
  pub nms_threshold: f32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入图片: {}", args.image);
  info!("置信度阈值: {}", args.confidence);
  info!("NMS 阈值: {}", args.nms_threshold);

  let config = DetectorConfig {
    confidence_threshold: args.confidence,
    iou_threshold: args.nms_threshold,
    ..DetectorConfig::default()
  };

  let mut detector = HazardDetector::with_config(config);
  detector
    .load(&args.model)
    .with_context(|| format!("无法加载模型: {}", args.model))?;

  let bytes =
    std::fs::read(&args.image).with_context(|| format!("无法读取图片文件: {}", args.image))?;

  info!("开始推理...");
  let now = std::time::Instant::now();
  let response = detector.process_frame(&bytes);
  info!("推理完成，耗时: {:.2?}", now.elapsed());

  if let DetectResponse::Success { detections, .. } = &response {
    info!("检测到 {} 个危险目标", detections.len());
    for det in detections {
      info!(
        "  - {}: {:.2}% at ({:.3}, {:.3}, {:.3}, {:.3})",
        det.class_name,
        det.confidence * 100.0,
        det.bbox[0],
        det.bbox[1],
        det.bbox[2],
        det.bbox[3]
      );
    }
  }

  println!("{}", response.to_json()?);

  Ok(())
}
