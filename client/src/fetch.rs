use choropleth_shared::{EducationRecord, Topology};
use serde::de::DeserializeOwned;

use crate::config::DataSources;

/// Both datasets, only ever produced together.
pub struct Datasets {
    pub topology: Topology,
    pub education: Vec<EducationRecord>,
}

fn labelled(label: &str, message: impl std::fmt::Display) -> String {
    format!("{label}: {message}")
}

/// GET `url` and decode its JSON body. `label` names the dataset in errors.
pub async fn fetch_json<T: DeserializeOwned>(label: &str, url: &str) -> Result<T, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| labelled(label, format!("fetch error: {e}")))?;
    if !resp.ok() {
        return Err(labelled(label, format!("HTTP {}", resp.status())));
    }
    resp.json::<T>()
        .await
        .map_err(|e| labelled(label, format!("parse error: {e}")))
}

/// Fetch both datasets concurrently. Fails if either one fails.
pub async fn fetch_datasets(sources: &DataSources) -> Result<Datasets, String> {
    let (topology, education) = futures::future::try_join(
        fetch_json::<Topology>("counties", &sources.counties),
        fetch_json::<Vec<EducationRecord>>("education", &sources.education),
    )
    .await?;
    Ok(Datasets {
        topology,
        education,
    })
}
