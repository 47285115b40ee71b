use rust_decimal::Decimal;
use tracing::info;

use crate::core::services::{ServiceError, ServiceResult};
use crate::currency::check_amount;
use crate::domain::ContractConfig;
use crate::ledger::LedgerStore;

pub struct ContractService;

impl ContractService {
    pub fn set_total(store: &LedgerStore, total: Decimal) -> ServiceResult<ContractConfig> {
        if check_amount(total)? < Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "contract value cannot be negative".into(),
            ));
        }
        let contract = ContractConfig::new(total);
        store.set_contract(&contract)?;
        info!(total = %total, "contract value updated");
        Ok(contract)
    }

    pub fn total(store: &LedgerStore) -> ServiceResult<Decimal> {
        Ok(store.contract()?.total_contract_value)
    }

    pub fn remaining(store: &LedgerStore) -> ServiceResult<Decimal> {
        Ok(store.contract_remaining()?)
    }
}
