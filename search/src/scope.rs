//! The scope consumer: issues backend calls and drains their deliveries into
//! the presentation models on the UI thread.

use crate::collector::{
    ActivationPayload, Collector, FilterSet, PreviewPayload, SearchPayload,
};
use crate::controller::CollectionController;
use crate::dispatch::{Delivery, DeliveryQueue, DeliverySender, delivery_channel};
use crate::error::{Result, ScopeError};
use crate::listener::{
    ActivationListener, ActivationReceiver, PreviewDataReceiver, SearchListener,
    SearchResultReceiver,
};
use crate::proxy::{NO_INTERNET_HINT, QueryCtrl, ScopeProxy, SearchMetadata, SearchRequest};
use crate::status::Status;
use dash_core::categories::Categories;
use dash_core::department::{DepartmentModel, DepartmentTree};
use dash_core::filters::FiltersModel;
use dash_core::preview::PreviewModel;
use dash_core::template::TemplateDefaults;
use dash_core::types::config::TtlConfig;
use dash_core::types::{ActivationResponse, CannedQuery, Category, Department, ScopeResult, ShellConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SCOPE_URI_SCHEME: &str = "scope://";

/// How long a scope's results stay fresh after a finished search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultsTtl {
    #[default]
    None,
    Small,
    Medium,
    Large,
}

impl ResultsTtl {
    pub fn duration(self, config: &TtlConfig) -> Option<Duration> {
        let ms = match self {
            ResultsTtl::None => return None,
            ResultsTtl::Small => config.small_ms,
            ResultsTtl::Medium => config.medium_ms,
            ResultsTtl::Large => config.large_ms,
        };
        Some(Duration::from_millis(ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeMetadata {
    pub id: String,
    pub display_name: String,
    pub results_ttl: ResultsTtl,
}

impl ScopeMetadata {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            results_ttl: ResultsTtl::None,
        }
    }

    pub fn with_results_ttl(mut self, results_ttl: ResultsTtl) -> Self {
        self.results_ttl = results_ttl;
        self
    }
}

/// Something the UI has to act on, queued until [`Scope::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeEvent {
    ShowDash,
    HideDash,
    ShowPreview(Arc<ScopeResult>),
    /// Open a query in another scope.
    PerformQuery(CannedQuery),
    /// Hand a non-scope uri to the system.
    ActivateUri(String),
    PreviewReady,
    StatusChanged(Status),
}

pub struct Scope {
    metadata: ScopeMetadata,
    config: ShellConfig,
    proxy: Option<Arc<dyn ScopeProxy>>,
    sender: DeliverySender,
    queue: DeliveryQueue,

    categories: Categories,
    filters: FiltersModel,
    department_tree: Option<DepartmentTree>,
    department_models: HashMap<String, DepartmentModel>,
    preview: Option<PreviewModel>,

    search_controller: CollectionController,
    preview_controller: CollectionController,
    activation_controller: CollectionController,
    active_search: Option<Arc<Collector<SearchPayload>>>,

    /// Results collected but not yet flushed into the models.
    pending_results: Vec<Arc<ScopeResult>>,
    /// Everything flushed per category during the current search.
    search_results: HashMap<String, Vec<Arc<ScopeResult>>>,
    flushed_once: bool,
    delivered_department: Option<Arc<Department>>,
    delivered_filters: Option<Arc<FilterSet>>,
    applied_department: Option<Arc<Department>>,
    applied_filters: Option<Arc<FilterSet>>,

    search_query: String,
    current_department: String,
    search_in_progress: bool,
    results_dirty: bool,
    is_active: bool,
    has_departments: bool,
    status: Status,
    ttl_deadline: Option<Instant>,
    events: Vec<ScopeEvent>,
}

impl Scope {
    pub fn new(metadata: ScopeMetadata, config: ShellConfig, defaults: Arc<TemplateDefaults>) -> Self {
        let (sender, queue) = delivery_channel(None);
        let categories = Categories::new(defaults, config.results.max_categories);
        Self {
            metadata,
            config,
            proxy: None,
            sender,
            queue,
            categories,
            filters: FiltersModel::default(),
            department_tree: None,
            department_models: HashMap::new(),
            preview: None,
            search_controller: CollectionController::new(),
            preview_controller: CollectionController::new(),
            activation_controller: CollectionController::new(),
            active_search: None,
            pending_results: Vec::new(),
            search_results: HashMap::new(),
            flushed_once: false,
            delivered_department: None,
            delivered_filters: None,
            applied_department: None,
            applied_filters: None,
            search_query: String::new(),
            current_department: String::new(),
            search_in_progress: false,
            results_dirty: false,
            is_active: false,
            has_departments: false,
            status: Status::Incomplete,
            ttl_deadline: None,
            events: Vec::new(),
        }
    }

    pub fn with_proxy(mut self, proxy: Arc<dyn ScopeProxy>) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the callback invoked from worker threads whenever a delivery is queued.
    pub fn with_notify(mut self, notify: Arc<dyn Fn() + Send + Sync>) -> Self {
        let (sender, queue) = delivery_channel(Some(notify));
        self.sender = sender;
        self.queue = queue;
        self
    }

    fn proxy(&self) -> Result<&Arc<dyn ScopeProxy>> {
        self.proxy
            .as_ref()
            .ok_or_else(|| ScopeError::NoProxy(self.metadata.id.clone()))
    }

    fn search_metadata(&self) -> SearchMetadata {
        let metadata = SearchMetadata::new(self.config.search.form_factor);
        if self.config.search.remote_content_search {
            metadata
        } else {
            metadata.with_hint(NO_INTERNET_HINT, true)
        }
    }

    fn issue_search(
        &self,
        request: &SearchRequest,
        listener: Arc<dyn SearchListener>,
    ) -> Result<Box<dyn QueryCtrl>> {
        Ok(self.proxy()?.search(request, listener)?)
    }

    fn issue_activation(
        &self,
        result: &Arc<ScopeResult>,
        action: Option<(&str, &str)>,
        listener: Arc<dyn ActivationListener>,
    ) -> Result<Box<dyn QueryCtrl>> {
        let proxy = self.proxy()?;
        let metadata = self.search_metadata();
        let ctrl = match action {
            Some((widget_id, action_id)) => {
                proxy.perform_action(result, &metadata, widget_id, action_id, listener)?
            }
            None => proxy.activate(result, &metadata, listener)?,
        };
        Ok(ctrl)
    }

    fn set_status(&mut self, status: Status) {
        if self.status != status {
            self.status = status;
            self.events.push(ScopeEvent::StatusChanged(status));
        }
    }
}

/// Read operations.
impl Scope {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &ScopeMetadata {
        &self.metadata
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn current_department_id(&self) -> &str {
        &self.current_department
    }

    pub fn search_in_progress(&self) -> bool {
        self.search_in_progress
    }

    pub fn results_dirty(&self) -> bool {
        self.results_dirty
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn has_departments(&self) -> bool {
        self.has_departments
    }

    /// A primary navigation filter is shown in place of departments.
    pub fn has_primary_filter(&self) -> bool {
        self.filters.primary_filter().is_some()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut Categories {
        &mut self.categories
    }

    pub fn filters(&self) -> &FiltersModel {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FiltersModel {
        &mut self.filters
    }

    pub fn department_tree(&self) -> Option<&DepartmentTree> {
        self.department_tree.as_ref()
    }

    pub fn preview_model(&self) -> Option<&PreviewModel> {
        self.preview.as_ref()
    }

    pub fn preview_model_mut(&mut self) -> Option<&mut PreviewModel> {
        self.preview.as_mut()
    }

    pub fn take_events(&mut self) -> Vec<ScopeEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Search operations.
impl Scope {
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.search_query == query {
            return;
        }
        self.search_query = query;
        self.invalidate_results();
    }

    /// Starts a new search, superseding the one in flight.
    pub fn dispatch_search(&mut self) {
        self.search_controller.invalidate();
        self.active_search = None;
        self.pending_results.clear();
        self.search_results.clear();
        self.flushed_once = false;
        self.results_dirty = false;
        self.ttl_deadline = None;
        self.categories.mark_new_search();

        let request = SearchRequest {
            query_string: self.search_query.clone(),
            department_id: self.current_department.clone(),
            filter_state: self.filters.filter_state().clone(),
            metadata: self.search_metadata(),
        };
        let receiver = SearchResultReceiver::new(self.sender.clone());
        let collector = Arc::clone(receiver.collector());
        self.search_controller.set_receiver(receiver.clone());
        self.search_in_progress = true;
        self.set_status(Status::Incomplete);

        match self.issue_search(&request, receiver) {
            Ok(ctrl) => {
                tracing::debug!(scope = %self.metadata.id, query = %request.query_string, "search dispatched");
                self.search_controller.set_controller(ctrl);
                self.active_search = Some(collector);
            }
            Err(e) => {
                tracing::warn!(scope = %self.metadata.id, error = %e, "failed to dispatch search");
                self.search_controller.invalidate();
                self.search_in_progress = false;
            }
        }
    }

    /// Re-runs the search now if the scope is visible, otherwise on activation.
    pub fn invalidate_results(&mut self) {
        if self.is_active {
            self.dispatch_search();
        } else {
            self.results_dirty = true;
        }
    }

    pub fn set_active(&mut self, active: bool) {
        if self.is_active == active {
            return;
        }
        self.is_active = active;
        if active && self.results_dirty {
            self.dispatch_search();
        }
    }

    /// Marks results dirty once the TTL of the last finished search elapsed.
    pub fn check_ttl(&mut self, now: Instant) {
        if let Some(deadline) = self.ttl_deadline
            && now >= deadline
        {
            self.ttl_deadline = None;
            tracing::debug!(scope = %self.metadata.id, "results expired");
            self.invalidate_results();
        }
    }

    /// Re-runs the search after the user edited the filters.
    pub fn apply_filter_changes(&mut self) {
        if self.filters.take_filter_state_changed() {
            self.invalidate_results();
        }
    }

    /// Resets the filters to their defaults and searches again.
    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.apply_filter_changes();
    }

    /// Navigates to a department and searches in it.
    pub fn load_department(&mut self, department_id: &str) {
        if self.current_department == department_id {
            return;
        }
        self.current_department = department_id.to_string();
        self.dispatch_search();
    }

    /// The navigation model for a department, loaded from the cached tree.
    ///
    /// Models are kept per department and reloaded whenever the tree changes.
    pub fn get_department(&mut self, department_id: &str) -> Option<&mut DepartmentModel> {
        let node = self
            .department_tree
            .as_ref()
            .and_then(|tree| tree.find_node_by_id(department_id));
        match (node, self.department_tree.as_ref()) {
            (Some(node), Some(tree)) => {
                let model = self
                    .department_models
                    .entry(department_id.to_string())
                    .or_insert_with(|| DepartmentModel::new(self.metadata.id.clone()));
                model.load_from_node(tree, node);
                Some(model)
            }
            _ => self.department_models.get_mut(department_id),
        }
    }

    /// Drains every queued delivery and applies it to the models.
    pub fn process_deliveries(&mut self) {
        for delivery in self.queue.drain() {
            match delivery {
                Delivery::Search(collector) => self.handle_search(&collector),
                Delivery::Preview(collector) => self.handle_preview(&collector),
                Delivery::Activation(collector) => self.handle_activation(&collector),
            }
        }
        // Batches cached inside the aggregation window still need a flush
        // once the window passed, even if no further delivery arrives.
        if self.search_in_progress
            && !self.pending_results.is_empty()
            && self
                .active_search
                .as_ref()
                .is_some_and(|c| c.elapsed() >= self.config.results.aggregation_window())
        {
            self.flush_updates();
        }
    }

    fn handle_search(&mut self, collector: &Collector<SearchPayload>) {
        let (status, payload) = collector.collect();
        if status == Status::Cancelled {
            tracing::debug!(scope = %self.metadata.id, "discarding cancelled search delivery");
            return;
        }
        self.pending_results.extend(payload.results);
        self.delivered_department = payload.department;
        self.delivered_filters = payload.filters;

        if !status.is_terminal() {
            if collector.elapsed() < self.config.results.aggregation_window() {
                tracing::trace!(scope = %self.metadata.id, "caching results inside aggregation window");
                return;
            }
            self.flush_updates();
            return;
        }

        self.flush_updates();
        self.categories.purge_results();
        self.search_in_progress = false;
        self.active_search = None;
        self.set_status(status);
        if status == Status::Finished {
            self.ttl_deadline = self
                .metadata
                .results_ttl
                .duration(&self.config.ttl)
                .map(|ttl| Instant::now() + ttl);
        }
        tracing::debug!(scope = %self.metadata.id, ?status, "search finished");
    }

    /// Applies pending results, departments, and filters to the models.
    pub fn flush_updates(&mut self) {
        let results = std::mem::take(&mut self.pending_results);
        let first_flush = !self.flushed_once;
        self.flushed_once = true;

        if self.config.results.incremental_diff {
            self.reconcile_results(results);
        } else {
            if first_flush {
                self.categories.clear_all();
            }
            self.append_results(results);
        }

        let department = self.delivered_department.clone();
        let filters = self.delivered_filters.clone();
        self.apply_department(department);
        self.apply_filters(filters);
    }

    fn reconcile_results(&mut self, results: Vec<Arc<ScopeResult>>) {
        for (category, batch) in group_by_category(results) {
            let id = category.id.to_string();
            let shown = self.search_results.entry(id.clone()).or_default();
            shown.extend(batch);
            let target = shown.clone();
            let stats = self
                .categories
                .register_category(category, None)
                .add_update_results(target);
            tracing::trace!(category = %id, ?stats, "reconciled category");
            self.categories.update_result_count(&id);
        }
    }

    fn append_results(&mut self, results: Vec<Arc<ScopeResult>>) {
        for (category, batch) in group_by_category(results) {
            let id = category.id.to_string();
            self.categories
                .register_category(category, None)
                .add_results(batch);
            self.categories.update_result_count(&id);
        }
    }

    fn apply_department(&mut self, department: Option<Arc<Department>>) {
        let unchanged = match (&department, &self.applied_department) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        self.applied_department = department.clone();

        let Some(department) = department else {
            self.has_departments = false;
            return;
        };
        // A tree built from a primary filter is never merged into.
        let merged = match self.department_tree.as_mut() {
            Some(tree) if self.has_departments => {
                let outcome = tree.merge(&department, &self.current_department);
                tracing::debug!(scope = %self.metadata.id, ?outcome, "merged departments");
                true
            }
            _ => false,
        };
        if !merged {
            self.department_tree = Some(DepartmentTree::from_department(&department));
        }
        self.has_departments = true;
        self.reload_department_models();
    }

    fn apply_filters(&mut self, filters: Option<Arc<FilterSet>>) {
        let Some(set) = filters else {
            return;
        };
        if self
            .applied_filters
            .as_ref()
            .is_some_and(|applied| Arc::ptr_eq(applied, &set))
        {
            return;
        }
        self.applied_filters = Some(Arc::clone(&set));

        self.filters.set_filter_state(set.state.clone());
        self.filters.update(&set.filters, self.has_departments, true);

        if !self.filters.take_primary_filter_changed() || self.has_departments {
            return;
        }
        let primary = self
            .filters
            .primary_filter()
            .and_then(|widget| set.filters.iter().find(|f| f.id == widget.id()));
        self.department_tree = primary.and_then(DepartmentTree::from_filter);
        self.reload_department_models();
    }

    fn reload_department_models(&mut self) {
        let Some(tree) = self.department_tree.as_ref() else {
            return;
        };
        for (id, model) in &mut self.department_models {
            if let Some(node) = tree.find_node_by_id(id) {
                model.load_from_node(tree, node);
            }
        }
        let parent = tree
            .find_node_by_id(&self.current_department)
            .and_then(|node| tree.parent(node))
            .and_then(|parent| tree.node(parent));
        if let Some(parent) = parent
            && let Some(model) = self.department_models.get_mut(&parent.id)
        {
            model.mark_subdepartment_active(&self.current_department);
        }
    }
}

/// Preview and activation operations.
impl Scope {
    /// Starts previewing `result`, replacing any preview in flight.
    pub fn preview(&mut self, result: Arc<ScopeResult>) {
        self.preview_controller.invalidate();
        let model = self.preview.get_or_insert_with(PreviewModel::new);
        model.clear();
        model.set_result(Arc::clone(&result));
        model.set_processing(true);

        let receiver = PreviewDataReceiver::new(self.sender.clone());
        self.preview_controller.set_receiver(receiver.clone());
        let issued = self
            .proxy()
            .and_then(|proxy| Ok(proxy.preview(&result, &self.search_metadata(), receiver)?));
        match issued {
            Ok(ctrl) => self.preview_controller.set_controller(ctrl),
            Err(e) => {
                tracing::warn!(scope = %self.metadata.id, error = %e, "failed to request preview");
                self.preview_controller.invalidate();
                if let Some(model) = self.preview.as_mut() {
                    model.set_processing(false);
                }
            }
        }
    }

    pub fn cancel_preview(&mut self) {
        self.preview_controller.invalidate();
        if let Some(model) = self.preview.as_mut() {
            model.set_processing(false);
        }
    }

    fn handle_preview(&mut self, collector: &Collector<PreviewPayload>) {
        let (status, payload) = collector.collect();
        if status == Status::Cancelled {
            tracing::debug!(scope = %self.metadata.id, "discarding cancelled preview delivery");
            return;
        }
        let Some(model) = self.preview.as_mut() else {
            return;
        };
        model.set_column_layouts(&payload.column_layouts);
        model.add_widget_definitions(&payload.widgets);
        model.update_preview_data(payload.data);
        if status.is_terminal() {
            model.set_processing(false);
            self.events.push(ScopeEvent::PreviewReady);
        }
    }

    pub fn activate(&mut self, result: Arc<ScopeResult>) {
        self.start_activation(result, None);
    }

    /// Triggers a preview widget action for `result`.
    pub fn perform_action(&mut self, result: Arc<ScopeResult>, widget_id: &str, action_id: &str) {
        self.start_activation(result, Some((widget_id, action_id)));
    }

    pub fn cancel_activation(&mut self) {
        self.activation_controller.invalidate();
    }

    fn start_activation(&mut self, result: Arc<ScopeResult>, action: Option<(&str, &str)>) {
        self.activation_controller.invalidate();
        let receiver = ActivationReceiver::new(self.sender.clone(), Arc::clone(&result));
        self.activation_controller.set_receiver(receiver.clone());
        match self.issue_activation(&result, action, receiver) {
            Ok(ctrl) => self.activation_controller.set_controller(ctrl),
            Err(e) => {
                tracing::warn!(scope = %self.metadata.id, uri = result.uri(), error = %e, "failed to activate result");
                self.activation_controller.invalidate();
            }
        }
    }

    fn handle_activation(&mut self, collector: &Collector<ActivationPayload>) {
        let (status, payload) = collector.collect();
        match status {
            Status::Incomplete => return,
            Status::Finished => {}
            status => {
                tracing::debug!(scope = %self.metadata.id, ?status, "activation did not finish");
                return;
            }
        }
        let (Some(response), Some(result)) = (payload.response, payload.result) else {
            return;
        };
        match response {
            ActivationResponse::NotHandled => self.activate_uri(result.uri()),
            ActivationResponse::ShowDash => self.events.push(ScopeEvent::ShowDash),
            ActivationResponse::HideDash => self.events.push(ScopeEvent::HideDash),
            ActivationResponse::ShowPreview => self.events.push(ScopeEvent::ShowPreview(result)),
            ActivationResponse::PerformQuery(query) => self.perform_query(query),
            ActivationResponse::UpdateResult(updated) => {
                let replaced = self
                    .categories
                    .lookup_category_mut(&payload.category_id)
                    .is_some_and(|model| model.update_result(&result, updated));
                if !replaced {
                    tracing::warn!(category = %payload.category_id, uri = result.uri(), "activated result is no longer shown");
                }
            }
        }
    }

    /// Follows a uri: `scope://` uris run a query, anything else goes to the system.
    pub fn activate_uri(&mut self, uri: &str) {
        if !uri.starts_with(SCOPE_URI_SCHEME) {
            self.events.push(ScopeEvent::ActivateUri(uri.to_string()));
            return;
        }
        match CannedQuery::from_uri(uri) {
            Ok(query) => self.perform_query(query),
            Err(e) => tracing::warn!(scope = %self.metadata.id, error = %e, "ignoring malformed scope uri"),
        }
    }

    /// Runs a canned query here, or asks the UI to open the scope it targets.
    pub fn perform_query(&mut self, query: CannedQuery) {
        if query.scope_id != self.metadata.id {
            self.events.push(ScopeEvent::PerformQuery(query));
            return;
        }
        self.search_query = query.query_string;
        self.current_department = query.department_id;
        self.filters.set_filter_state(query.filter_state);
        self.dispatch_search();
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.search_controller.invalidate();
        self.preview_controller.invalidate();
        self.activation_controller.invalidate();
    }
}

/// Splits results per category, keeping categories in first-seen order.
fn group_by_category(results: Vec<Arc<ScopeResult>>) -> Vec<(Arc<Category>, Vec<Arc<ScopeResult>>)> {
    let mut groups: Vec<(Arc<Category>, Vec<Arc<ScopeResult>>)> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|(c, _)| c.id == result.category().id) {
            Some((_, batch)) => batch.push(result),
            None => groups.push((Arc::clone(result.category()), vec![result])),
        }
    }
    groups
}

