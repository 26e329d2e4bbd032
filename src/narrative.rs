//! Commentary templates
//!
//! Deterministic Korean sentences for anomaly records and the overall
//! narrative. The same template is used when comments are first generated
//! and when they are rebuilt after capping.

use crate::catalog::MetricCatalog;
use crate::types::{AnomalyKind, AnomalyRecord};

/// Narrative when a window yields no anomalies
pub const NO_ANOMALY_NARRATIVE: &str =
    "측정 기간 동안 특별한 변화나 특이사항이 발견되지 않았습니다. 현재의 건강 관리를 유지하세요.";

/// Narrative for steady-profile records
pub const STEADY_NARRATIVE: &str = "모든 지표가 평균 범위 내에 있습니다.";

/// Sentence for one anomaly, or `None` for kinds without a template
pub fn comment_for(catalog: &MetricCatalog, anomaly: &AnomalyRecord) -> Option<String> {
    match anomaly.kind {
        AnomalyKind::SpikeUp | AnomalyKind::SpikeDown => {
            let unit = catalog.get(anomaly.metric).unit;
            let direction = if anomaly.kind == AnomalyKind::SpikeUp {
                "높았습니다"
            } else {
                "낮았습니다"
            };
            Some(format!(
                "{}, 평소에 비해 {} 수치가 {}{}로, 평소보다 {}% {}.",
                anomaly.month_day(),
                anomaly.metric_name,
                anomaly.value,
                unit,
                anomaly.percent_change.unwrap_or_default(),
                direction
            ))
        }
        AnomalyKind::HighVariability => Some(format!(
            "{}, {} 수치가 평소보다 크게 변동했습니다(변동계수: {}%).",
            anomaly.month_day(),
            anomaly.metric_name,
            anomaly.cv.unwrap_or_default()
        )),
        AnomalyKind::TrendUp | AnomalyKind::TrendDown => None,
    }
}

/// Drop repeated comments, keeping the first occurrence of each
pub fn dedup_comments(comments: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(comments.len());
    for comment in comments {
        if !unique.contains(&comment) {
            unique.push(comment);
        }
    }
    unique
}

/// Final narrative: anomaly count followed by every unique comment
pub fn compose(anomaly_count: usize, comments: &[String]) -> String {
    if anomaly_count == 0 {
        return NO_ANOMALY_NARRATIVE.to_string();
    }
    format!(
        "측정 기간 동안 {}개의 특이사항이 발견되었습니다. {}",
        anomaly_count,
        comments.join(" ")
    )
}
