// ==========================================
// 工厂运营驾驶舱 - 命令行演示入口
// ==========================================
// 流程: 加载配置 -> 装配 AppState -> 缺勤演练 -> 逐条执行建议
//       -> 停机服务分析与预约 -> 服务阶段推进
// ==========================================

use anyhow::Context;
use chrono::Local;
use factory_ops::api::ServiceRequest;
use factory_ops::app::{get_default_config_path, AppState};
use factory_ops::config::config_manager::config_keys;
use factory_ops::engine::ServiceProgress;
use factory_ops::logging::{self, LogFormat};
use factory_ops::{ServiceType, Shift, VendorEstimate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_format = std::env::var(config_keys::LOG_FORMAT).ok();
    logging::init_with_format(LogFormat::parse(log_format.as_deref()));

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", factory_ops::APP_NAME);
    tracing::info!("系统版本: {}", factory_ops::VERSION);
    tracing::info!("==================================================");

    let config_path = get_default_config_path();
    let shift = Shift::for_time(Local::now().time());
    let state = AppState::new(&config_path, shift).context("无法初始化AppState")?;
    tracing::info!("当前配置:\n{}", state.config.get_config_snapshot()?);

    let refresher = state.start_refresh();

    // ==========================================
    // 人力调配演练
    // ==========================================
    let board = state.labor_api.run_absenteeism_scenario().await?;
    println!("{}", board.event);
    println!("{}", serde_json::to_string_pretty(&board)?);

    for suggestion in &board.suggestions {
        let report = state
            .labor_api
            .execute_suggestion_if_unchanged(&suggestion.id)?;
        tracing::info!(
            "已执行: {} -> {:?} (workers={})",
            suggestion.action.title,
            report.outcome,
            report.affected_worker_ids.len()
        );
    }
    println!("{}", serde_json::to_string_pretty(&state.labor_api.get_summary()?)?);

    // ==========================================
    // 设备停机服务演练
    // ==========================================
    let request = ServiceRequest::new("R02", ServiceType::Breakdown)
        .with_issue("Servo axis 3 overcurrent")
        .with_vendors(vec![
            VendorEstimate {
                vendor_name: "OEM Service".to_string(),
                repair_estimate_inr: 85_000.0,
                warranty_months: 6,
                completion_time: "24h".to_string(),
                reputation_score: 4.8,
                description: "Authorized repair".to_string(),
                voids_warranty: false,
            },
            VendorEstimate {
                vendor_name: "Local Robotics".to_string(),
                repair_estimate_inr: 42_000.0,
                warranty_months: 1,
                completion_time: "12h".to_string(),
                reputation_score: 4.1,
                description: "Third-party repair".to_string(),
                voids_warranty: true,
            },
        ]);
    let analysis = state.machine_api.analyze_service(&request)?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    let booking = state.machine_api.book_service(&analysis, None, None)?;
    tracing::info!(
        "已预约服务: machine={}, strategy={}, vendor={:?}",
        booking.machine_id,
        booking.strategy_name,
        booking.vendor_name
    );

    while let ServiceProgress::Advanced(stage) = state.machine_api.advance_service_stage(&booking.machine_id)? {
        tracing::info!("服务进度: {} -> {}", booking.machine_id, stage);
    }
    println!("{}", serde_json::to_string_pretty(&state.machine_api.list_machines()?)?);

    let frames = refresher.shutdown().await?;
    tracing::info!("演示结束，快照刷新 {} 次", frames);
    Ok(())
}
