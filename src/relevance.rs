// src/relevance.rs
//! Relevance filter: factuality gate, analytical-value gate, topic categorization,
//! domestic-framing check and priority scoring.
//!
//! Keyword tables come from TOML (`config/selection.toml`) and are immutable once
//! loaded. The filter itself is pure: the same `title`/`content`/`source` always
//! produce the same annotations.

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::news::{Candidate, ScoredCandidate};
use crate::source_weights::SourceWeights;

// --- env defaults & names ---
pub const DEFAULT_SELECTION_CONFIG_PATH: &str = "config/selection.toml";
pub const ENV_SELECTION_CONFIG_PATH: &str = "SELECTION_CONFIG_PATH";

/* ----------------------------
Config schema (from TOML)
---------------------------- */

/// One topic category with its keyword set. Declaration order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryCfg {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Fixed keyword tables driving the filter and the eligibility query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterTables {
    /// Opinion / column / sponsored / forum markers.
    pub exclusion_terms: Vec<String>,
    /// Government administrative boilerplate (appointments, circulars).
    pub admin_notice_terms: Vec<String>,
    /// Regexes for percentages and amounts with unit suffixes.
    pub numeric_patterns: Vec<String>,
    /// "Concrete content" vocabulary (release, statistics, growth...).
    pub concrete_terms: Vec<String>,
    pub concrete_min_hits: usize,
    /// A title holding both markers reads as a generic circular.
    pub issuance_marker: String,
    pub office_marker: String,
    /// Titles longer than this (in characters) pass the analytical gate on their own.
    pub title_length_threshold: usize,
    pub categories: Vec<CategoryCfg>,
    pub default_category: String,
    pub foreign_terms: Vec<String>,
    pub domestic_terms: Vec<String>,
    pub domestic_bonus: i32,
    /// Central-government sources published elsewhere; never offered for review.
    pub excluded_sources: Vec<String>,
    pub source_weights: SourceWeights,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FilterTables {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl FilterTables {
    /// Built-in tables; `config/selection.toml` mirrors these.
    pub fn default_seed() -> Self {
        let categories = [
            ("정책", &["政策", "政府", "通知", "规划", "强制", "意见"][..]),
            (
                "거시경제",
                &[
                    "经济", "增长", "消费", "投资", "货币", "利率", "储蓄", "人口", "劳动", "出口",
                    "进口", "贸易", "一带一路",
                ][..],
            ),
            (
                "산업",
                &["制造", "产业", "工业", "上游", "下游", "开发区", "产业园区"][..],
            ),
            (
                "에너지",
                &[
                    "能源", "电力", "电池", "新能源", "太阳能", "光伏", "氢能", "核能", "核聚变",
                    "钍能", "风能", "风电", "地热",
                ][..],
            ),
            (
                "금융",
                &["银行", "金融", "融资", "股票", "债券", "证券", "上市"][..],
            ),
            (
                "기업",
                &["企业", "公司", "股", "高管", "并购", "股东", "项目"][..],
            ),
            (
                "기술",
                &[
                    "技术", "科技", "AI", "机器人", "无人机", "智能制造", "生物", "自动驾驶", "超算",
                    "量子", "航天", "新材料", "6G", "5G", "3D打印",
                ][..],
            ),
        ]
        .into_iter()
        .map(|(name, kws)| CategoryCfg {
            name: name.to_string(),
            keywords: strings(kws),
        })
        .collect();

        Self {
            exclusion_terms: strings(&[
                "论评", "专栏", "社论", "观点", "评论", "投稿", "广告", "PR", "新闻稿", "赞助", "专题",
                "访谈", "座谈", "论坛", "活动", "开幕",
            ]),
            admin_notice_terms: strings(&[
                "人事任免",
                "干部",
                "党委",
                "组织部",
                "纪委",
                "关于印发",
                "办公厅关于",
                "工作方案",
                "管理办法",
                "人民政府办公",
                "通知如下",
                "现印发给你们",
            ]),
            numeric_patterns: strings(&[
                r"\d+%",
                r"\d+亿",
                r"\d+万",
                r"\d+兆",
                r"\d+元",
                r"\d+\.\d+%",
            ]),
            concrete_terms: strings(&[
                "发布", "公布", "统计", "数据", "报告", "政策", "措施", "方案", "规定", "条例", "增长",
                "下降", "上涨", "下跌", "同比", "环比",
            ]),
            concrete_min_hits: 2,
            issuance_marker: "印发".to_string(),
            office_marker: "办公".to_string(),
            title_length_threshold: 15,
            categories,
            default_category: "기타".to_string(),
            foreign_terms: strings(&["美国", "欧洲", "日本", "韩国", "东南亚", "国际"]),
            domestic_terms: strings(&["中国", "国内", "本土", "央行", "发改委", "工信部"]),
            domestic_bonus: 5,
            excluded_sources: strings(&["ndrc", "pboc", "mofcom", "nbs", "gov", "xinhuanet"]),
            source_weights: SourceWeights::default_seed(),
        }
    }

    /// Category names in declaration order (the default category is not included).
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }
}

/// Number of distinct `terms` contained in `text`.
fn count_terms(text: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|t| !t.is_empty() && text.contains(t.as_str()))
        .count()
}

fn contains_any(text: &str, terms: &[String]) -> bool {
    count_terms(text, terms) > 0
}

/* ----------------------------
Verdicts
---------------------------- */

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ExclusionTerm,
    AdminNotice,
    IssuanceOffice,
    NoAnalyticalSignal,
}

impl Rejection {
    pub fn reason(self) -> &'static str {
        match self {
            Rejection::ExclusionTerm => "factuality:exclusion",
            Rejection::AdminNotice => "factuality:admin_notice",
            Rejection::IssuanceOffice => "analytical:issuance_office",
            Rejection::NoAnalyticalSignal => "analytical:no_signal",
        }
    }
}

/* ----------------------------
Compiled filter
---------------------------- */

/// Tables plus compiled numeric regexes.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    tables: FilterTables,
    numeric: Vec<Regex>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl RelevanceFilter {
    /// Compile and validate a set of tables.
    pub fn new(tables: FilterTables) -> anyhow::Result<Self> {
        let numeric = tables
            .numeric_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| anyhow::anyhow!("numeric pattern `{}` regex error: {}", p, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for c in &tables.categories {
            if c.name.trim().is_empty() {
                anyhow::bail!("category with empty name");
            }
            if !seen.insert(c.name.as_str()) {
                anyhow::bail!("duplicate category `{}`", c.name);
            }
        }
        if seen.contains(tables.default_category.as_str()) {
            anyhow::bail!(
                "default category `{}` must not also be a declared category",
                tables.default_category
            );
        }

        Ok(Self { tables, numeric })
    }

    /// Filter over the built-in tables.
    pub fn default_seed() -> Self {
        Self::new(FilterTables::default_seed()).expect("built-in filter tables")
    }

    /// Load from a TOML string. Missing keys keep their built-in values.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let tables: FilterTables = toml::from_str(toml_str)?;
        Self::new(tables)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading selection config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing selection config at {}", path.display()))
    }

    /// Resolve the config:
    /// 1) `$SELECTION_CONFIG_PATH` (must exist and parse)
    /// 2) `config/selection.toml` if present
    /// 3) built-in seed
    pub fn from_toml() -> anyhow::Result<Self> {
        if let Ok(p) = std::env::var(ENV_SELECTION_CONFIG_PATH) {
            return Self::from_path(&PathBuf::from(p));
        }
        let default_path = PathBuf::from(DEFAULT_SELECTION_CONFIG_PATH);
        if default_path.exists() {
            return Self::from_path(&default_path);
        }
        Ok(Self::default_seed())
    }

    pub fn tables(&self) -> &FilterTables {
        &self.tables
    }

    /// Step 1: opinion/sponsored markers or administrative boilerplate reject.
    pub fn check_factual(&self, text: &str) -> Result<(), Rejection> {
        if contains_any(text, &self.tables.exclusion_terms) {
            return Err(Rejection::ExclusionTerm);
        }
        if contains_any(text, &self.tables.admin_notice_terms) {
            return Err(Rejection::AdminNotice);
        }
        Ok(())
    }

    /// Step 2: numbers, concrete vocabulary, or a long title.
    pub fn check_analytical_value(&self, title: &str, text: &str) -> Result<(), Rejection> {
        let t = &self.tables;
        if !t.issuance_marker.is_empty()
            && !t.office_marker.is_empty()
            && title.contains(t.issuance_marker.as_str())
            && title.contains(t.office_marker.as_str())
        {
            return Err(Rejection::IssuanceOffice);
        }

        if self.numeric.iter().any(|re| re.is_match(text)) {
            return Ok(());
        }
        if count_terms(text, &t.concrete_terms) >= t.concrete_min_hits {
            return Ok(());
        }
        if title.chars().count() > t.title_length_threshold {
            return Ok(());
        }
        Err(Rejection::NoAnalyticalSignal)
    }

    /// Step 3: highest keyword count wins; ties go to the first-declared category.
    pub fn categorize(&self, text: &str) -> String {
        let mut best: Option<(&str, usize)> = None;
        for c in &self.tables.categories {
            let hits = count_terms(text, &c.keywords);
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if hits <= top => {}
                _ => best = Some((c.name.as_str(), hits)),
            }
        }
        best.map(|(name, _)| name.to_string())
            .unwrap_or_else(|| self.tables.default_category.clone())
    }

    /// Step 4: domestic unless clearly foreign-dominated.
    pub fn is_domestic(&self, text: &str) -> bool {
        let foreign = count_terms(text, &self.tables.foreign_terms);
        let domestic = count_terms(text, &self.tables.domestic_terms);
        domestic > foreign || foreign <= 1
    }

    /// Step 5: source tier plus the domestic bonus.
    pub fn priority_score(&self, source: &str, is_domestic: bool) -> i32 {
        let bonus = if is_domestic {
            self.tables.domestic_bonus
        } else {
            0
        };
        self.tables.source_weights.weight_for(source) + bonus
    }

    /// Run all five steps on one candidate.
    pub fn evaluate(&self, candidate: &Candidate) -> Result<ScoredCandidate, Rejection> {
        let text = candidate.text();
        self.check_factual(&text)?;
        self.check_analytical_value(&candidate.title, &text)?;

        let category = self.categorize(&text);
        let is_domestic = self.is_domestic(&text);
        let priority_score = self.priority_score(&candidate.source, is_domestic);

        Ok(ScoredCandidate {
            candidate: candidate.clone(),
            category,
            is_domestic,
            priority_score,
        })
    }

    /// Keep relevant candidates (input order preserved), annotated.
    pub fn filter_news(&self, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
        let mut kept = Vec::with_capacity(candidates.len());
        for c in candidates {
            match self.evaluate(c) {
                Ok(scored) => kept.push(scored),
                Err(rejection) => {
                    debug!(target: "relevance", id = c.id, reason = rejection.reason(), "candidate rejected");
                }
            }
        }
        kept
    }
}

/* ----------------------------
Tests
---------------------------- */
