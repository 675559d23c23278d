use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting ETL process...");

        // Extract
        println!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        println!("Extracted {} records", raw_data.len());
        self.monitor.log_phase("Extract");

        // Transform
        println!("Transforming data...");
        let result = self.pipeline.transform(raw_data).await?;
        println!(
            "Transformed {} records, {} survived",
            result.report.input_records, result.report.output_records
        );
        tracing::info!(
            "Dropped {} incomplete, {} duplicate, {} underage records",
            result.report.dropped_incomplete,
            result.report.dropped_duplicates,
            result.report.dropped_minors
        );
        self.monitor.log_phase("Transform");

        // Load
        println!("Loading data...");
        let output_path = self.pipeline.load(result).await?;
        println!("Output saved to: {}", output_path);
        self.monitor.log_phase("Load");
        self.monitor.log_summary();

        Ok(output_path)
    }
}
