use crate::catalog::PlotCatalog;

pub struct AppState {
    pub catalog: PlotCatalog,
}

impl AppState {
    pub fn new(catalog: PlotCatalog) -> Self {
        AppState { catalog }
    }
}
