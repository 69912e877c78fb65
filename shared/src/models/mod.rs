//! Domain models

pub mod cash;
pub mod expense;
pub mod material;
pub mod product;
pub mod sale;

pub use cash::{CashCloseRecord, CashOpen, CashSession};
pub use expense::{ExpenseCreate, ExpenseRecord, HistoryEntry};
pub use material::{MaterialCreate, RawMaterial, StockAdjust, StockShortage};
pub use product::{Product, ProductCreate, RecipeLine, RecipeLineView};
pub use sale::{CartAdd, CartLine, ConfirmSale, ItemOptions, SaleRecord, SoldLine};
