/*
[INPUT]:  Task identifiers and analysis submission parameters
[OUTPUT]: Task lifecycle data (status, progress, final report)
[POS]:    HTTP layer - analysis job endpoints
[UPDATE]: When the analysis API adds endpoints or changes response format
*/

use crate::http::{ApiClient, Result};
use crate::types::{
    AnalysisRequest, AnalysisResult, ResultFetch, StartAnalysisResponse, StatusResponse,
};
use reqwest::{Method, StatusCode};

impl ApiClient {
    /// Submit a new analysis job
    ///
    /// POST /analysis/start
    pub async fn start_analysis(&self, req: &AnalysisRequest) -> Result<StartAnalysisResponse> {
        let builder = self.request(Method::POST, "/analysis/start")?.json(req);
        self.send_json(builder).await
    }

    /// Query the status of a running analysis
    ///
    /// GET /analysis/status/{task_id}
    pub async fn analysis_status(&self, task_id: &str) -> Result<StatusResponse> {
        let endpoint = format!("/analysis/status/{task_id}");
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(builder).await
    }

    /// Fetch the final analysis report
    ///
    /// GET /analysis/result/{task_id}
    ///
    /// 200 carries the report. 202 means the job has not produced a report
    /// yet (single-endpoint readiness protocol). 404 means the server no
    /// longer knows the task and surfaces as `SessionExpired`.
    pub async fn analysis_result(&self, task_id: &str) -> Result<ResultFetch> {
        let endpoint = format!("/analysis/result/{task_id}");
        let builder = self.request(Method::GET, &endpoint)?;

        let response = builder.send().await?;
        if response.status() == StatusCode::ACCEPTED {
            return Ok(ResultFetch::Pending);
        }

        let response = Self::check_status(response).await?;
        let report: AnalysisResult = response.json().await?;
        Ok(ResultFetch::Ready(report))
    }
}
