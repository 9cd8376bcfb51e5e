use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use serde_json::Value;

use obstrack_core::{
    export_file_name, status_counts, to_csv, Observation, Status, TrackerFilter,
};
use obstrack_dataverse::wire::{list_from_value, observation_from_value};

#[derive(Parser, Debug)]
#[command(
    name = "obstrack-cli",
    about = "Đọc một trang dữ liệu quan sát kiểm toán (JSON Dataverse), lọc và thống kê."
)]
struct Args {
    /// Đường dẫn tới file JSON chứa envelope { "value": [...] }.
    #[arg(short, long)]
    input: PathBuf,

    /// Lọc theo trạng thái lưu trữ: in-progress, overdue, closed.
    #[arg(long)]
    status: Option<String>,

    /// Tìm kiếm tự do trên quan sát, đợt kiểm toán, phòng ban, người phụ trách.
    #[arg(long)]
    search: Option<String>,

    /// Ghi kết quả đã lọc ra file CSV tại đường dẫn này.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn parse_status(value: &str) -> anyhow::Result<Status> {
    match value.to_lowercase().as_str() {
        "in-progress" | "inprogress" => Ok(Status::InProgress),
        "overdue" => Ok(Status::Overdue),
        "closed" => Ok(Status::Closed),
        other => anyhow::bail!("Trạng thái không hợp lệ: {other}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;
    let envelope: Value =
        serde_json::from_str(&data).with_context(|| "File không phải JSON hợp lệ")?;

    let observations = list_from_value(&envelope, observation_from_value)
        .with_context(|| "Không ánh xạ được trang dữ liệu")?;

    let filter = TrackerFilter {
        search: args.search.unwrap_or_default(),
        status: args.status.as_deref().map(parse_status).transpose()?,
        ..TrackerFilter::default()
    };
    let kept: Vec<Observation> = filter.apply(&observations).into_iter().cloned().collect();

    let counts = status_counts(&kept);
    println!(
        "Observations: {}\nIn Progress: {}\nOverdue: {}\nClosed: {}",
        counts.total, counts.in_progress, counts.overdue, counts.closed
    );

    if let Some(path) = args.csv {
        std::fs::write(&path, to_csv(&kept))
            .with_context(|| format!("Không ghi được file {path:?}"))?;
        println!("Đã ghi {} bản ghi vào {path:?}", kept.len());
    } else {
        println!(
            "Gợi ý tên file xuất: {}",
            export_file_name(Utc::now().date_naive())
        );
    }

    Ok(())
}
