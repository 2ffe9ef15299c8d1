use crate::{Product, RunSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadState,
    FetchProducts,
    Notify {
        product: Product,
        subject: String,
        body: String,
    },
    /// Replace the state file with the full current product list.
    SaveState(Vec<Product>),
    Finish(RunSummary),
}
