use crate::domain::model::Job;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 執行單一轉換工作的元件（SVG 點陣化、音訊擷取等）
#[async_trait]
pub trait Converter: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// 成功時回傳輸出檔大小（bytes）
    async fn convert(&self, job: &Job) -> Result<u64>;
}
