pub mod change_assets;
pub mod create_fund;
pub mod deposit;
pub mod exec_transaction;
pub mod manager_fee;
pub mod members;
pub mod trader;
pub mod transfer;
pub mod withdraw;

pub use create_fund::CreateFundParams;
