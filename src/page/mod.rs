//! Page composition: the initial concurrent load of all three collections and
//! the tabbed panel built from it.

use std::sync::Arc;

use futures_util::future::join3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cache::{RenderCache, PAGE_PATH};
use crate::errors::AppError;
use crate::models::{Employee, JobTitle, Shift};
use crate::notify::{Confirm, Notifier};
use crate::store::RecordStore;
use crate::table::TableController;

/// The store clients for every editable collection, constructed once and passed down.
#[derive(Clone)]
pub struct PanelStores {
    pub employees: Arc<dyn RecordStore<Employee>>,
    pub job_titles: Arc<dyn RecordStore<JobTitle>>,
    pub shifts: Arc<dyn RecordStore<Shift>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub employees: Vec<Employee>,
    pub job_titles: Vec<JobTitle>,
    pub shifts: Vec<Shift>,
}

/// Fetches the three lists concurrently and waits for all of them.
///
/// If any fetch fails the successful results are discarded and every error
/// message is returned in [`AppError::LoadFailed`].
pub async fn load_snapshot(stores: &PanelStores) -> Result<PageSnapshot, AppError> {
    let (employees, job_titles, shifts) = join3(
        stores.employees.list(),
        stores.job_titles.list(),
        stores.shifts.list(),
    )
    .await;

    match (employees, job_titles, shifts) {
        (Ok(employees), Ok(job_titles), Ok(shifts)) => Ok(PageSnapshot {
            employees,
            job_titles,
            shifts,
        }),
        (employees, job_titles, shifts) => {
            let errors: Vec<String> = [employees.err(), job_titles.err(), shifts.err()]
                .into_iter()
                .flatten()
                .map(|err| err.message())
                .collect();
            warn!("Page load failed: {:?}", errors);
            Err(AppError::LoadFailed(errors))
        }
    }
}

/// Serves the page snapshot from `cache`, loading it when the path was invalidated.
pub async fn load_cached(
    stores: &PanelStores,
    cache: &RenderCache<PageSnapshot>,
) -> Result<PageSnapshot, AppError> {
    if let Some(snapshot) = cache.get(PAGE_PATH) {
        debug!("Serving cached page snapshot");
        return Ok(snapshot);
    }
    let generation = cache.generation();
    let snapshot = load_snapshot(stores).await?;
    cache.put_if_current(PAGE_PATH, snapshot.clone(), generation);
    Ok(snapshot)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    #[serde(rename = "usuarios")]
    Employees,
    #[serde(rename = "cargos")]
    JobTitles,
    #[serde(rename = "horarios")]
    Shifts,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Employees => "Usuarios",
            Tab::JobTitles => "Cargos",
            Tab::Shifts => "Horarios",
        }
    }
}

/// Three independent tables. Switching tabs never re-fetches.
pub struct Panel {
    pub employees: TableController<Employee>,
    pub job_titles: TableController<JobTitle>,
    pub shifts: TableController<Shift>,
    active_tab: Tab,
}

impl Panel {
    pub fn new(
        stores: &PanelStores,
        snapshot: PageSnapshot,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirm>,
    ) -> Self {
        Panel {
            employees: TableController::new(
                stores.employees.clone(),
                notifier.clone(),
                confirmer.clone(),
                snapshot.employees,
            ),
            job_titles: TableController::new(
                stores.job_titles.clone(),
                notifier.clone(),
                confirmer.clone(),
                snapshot.job_titles,
            ),
            shifts: TableController::new(stores.shifts.clone(), notifier, confirmer, snapshot.shifts),
            active_tab: Tab::default(),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }
}

pub enum PageView {
    Ready(Box<Panel>),
    /// Only the aggregate error list is shown.
    Failed(Vec<String>),
}

pub async fn compose(
    stores: &PanelStores,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirm>,
) -> PageView {
    match load_snapshot(stores).await {
        Ok(snapshot) => PageView::Ready(Box::new(Panel::new(stores, snapshot, notifier, confirmer))),
        Err(AppError::LoadFailed(errors)) => PageView::Failed(errors),
        Err(other) => PageView::Failed(vec![other.message()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryStore, Operation};

    #[test]
    fn tabs_serialize_as_collection_names() {
        assert_eq!(serde_json::to_string(&Tab::JobTitles).unwrap(), "\"cargos\"");
        assert_eq!(Tab::default(), Tab::Employees);
        assert_eq!(Tab::Shifts.label(), "Horarios");
    }

    #[tokio::test]
    async fn collects_every_failure() {
        let employees = Arc::new(MemoryStore::<Employee>::new());
        let shifts = Arc::new(MemoryStore::<Shift>::new());
        employees.fail_on(Operation::List, "timeout");
        shifts.fail_on(Operation::List, "permission denied");
        let stores = PanelStores {
            employees,
            job_titles: Arc::new(MemoryStore::<JobTitle>::new()),
            shifts,
        };

        let err = load_snapshot(&stores).await.unwrap_err();
        assert_eq!(
            err,
            AppError::LoadFailed(vec!["timeout".into(), "permission denied".into()])
        );
    }
}
