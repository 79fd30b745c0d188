//! M01: CompanyContext. No declared dependencies; every other module
//! reads this from `context`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use fathom_core::{module::Context, Adapter, Module};
use fathom_types::payloads::{BusinessModel, CompanyContext, Vertical};
use fathom_types::{FathomError, ModuleId, ModulePayload};

use crate::support::{keyword_score, success};

const VERTICAL_KEYWORDS: &[(&str, Vertical)] = &[
    ("retail", Vertical::Commerce),
    ("commerce", Vertical::Commerce),
    ("marketplace", Vertical::Commerce),
    ("media", Vertical::Content),
    ("publish", Vertical::Content),
    ("news", Vertical::Content),
    ("support", Vertical::Support),
    ("helpdesk", Vertical::Support),
    ("ticketing", Vertical::Support),
];

const B2B_KEYWORDS: &[(&str, f64)] = &[("enterprise", 1.0), ("b2b", 1.0), ("saas", 0.5)];
const B2B2C_KEYWORDS: &[(&str, f64)] = &[("marketplace", 1.0), ("platform connecting", 1.0)];

pub struct CompanyContextModule {
    web_search: Arc<dyn Adapter>,
    finance: Arc<dyn Adapter>,
}

impl CompanyContextModule {
    #[must_use]
    pub fn new(web_search: Arc<dyn Adapter>, finance: Arc<dyn Adapter>) -> Self {
        Self { web_search, finance }
    }

    fn classify_vertical(description: &str) -> Vertical {
        let lower = description.to_ascii_lowercase();
        VERTICAL_KEYWORDS
            .iter()
            .find(|(kw, _)| lower.contains(kw))
            .map_or(Vertical::Commerce, |(_, v)| *v)
    }

    fn classify_business_model(description: &str) -> BusinessModel {
        if keyword_score(description, B2B2C_KEYWORDS) > 0.0 {
            BusinessModel::B2B2C
        } else if keyword_score(description, B2B_KEYWORDS) > 0.0 {
            BusinessModel::B2B
        } else {
            BusinessModel::B2C
        }
    }
}

#[async_trait]
impl Module for CompanyContextModule {
    fn id(&self) -> ModuleId {
        ModuleId::M01CompanyContext
    }

    async fn execute(
        &self,
        domain: &str,
        _context: &Context,
        force_refresh: bool,
    ) -> Result<fathom_types::ModuleResult, FathomError> {
        let started = Instant::now();
        let mut params = BTreeMap::new();
        params.insert("q".to_string(), domain.to_string());
        let search = self.web_search.call("search", &params, force_refresh).await?;

        let description = search.data["results"][0]["snippet"]
            .as_str()
            .unwrap_or("")
            .to_string();
        let name = domain
            .split('.')
            .next()
            .map(|s| {
                let mut chars = s.chars();
                chars.next().map_or(String::new(), |first| {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                })
            })
            .unwrap_or_else(|| domain.to_string());

        let mut supporting = Vec::new();
        let (ticker, exchange) = match self.finance.call("quote", &BTreeMap::new(), force_refresh).await {
            Ok(quote) => {
                supporting.push(quote.citation.clone());
                (
                    quote.data["ticker"].as_str().map(str::to_string),
                    quote.data["exchange"].as_str().map(str::to_string),
                )
            }
            Err(err) if err.is_benign() => (None, None),
            Err(err) => return Err(err),
        };

        let vertical = Self::classify_vertical(&description);
        let business_model = Self::classify_business_model(&description);

        let mut filled = 0u32;
        let total_fields = 7u32;
        if ticker.is_some() {
            filled += 1;
        }
        if exchange.is_some() {
            filled += 1;
        }
        if !description.is_empty() {
            filled += 2;
        }
        filled += 1; // name always derivable
        filled += 1; // vertical always assigned
        filled += 1; // business_model always assigned
        let data_quality_score = f64::from(filled) / f64::from(total_fields);

        let payload = CompanyContext {
            name,
            ticker,
            exchange,
            headquarters: None,
            vertical,
            sub_vertical: None,
            business_model,
            employee_count: None,
            store_count: None,
            brands: Vec::new(),
            founded_year: None,
            description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
            data_quality_score: data_quality_score.clamp(0.0, 1.0),
        };

        Ok(success(
            self.id(),
            domain,
            ModulePayload::CompanyContext(payload),
            search.citation,
            supporting,
            started,
        ))
    }
}
