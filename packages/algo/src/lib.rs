//! # affinity-algo - 学习者/内容匹配度核心算法库
//!
//! 本 crate 提供纯 Rust 实现的匹配度评分算法:
//!
//! - **Cosine Similarity** - 向量余弦相似度 (零范数降级为 0 并标记)
//! - **Gap Coverage** - 知识薄弱点覆盖率 (按领域权重加权)
//! - **Progressive Difficulty** - 基于近期表现的渐进难度校准
//! - **Affinity Aggregator** - 四项信号的加权线性组合
//!
//! ## 设计理念
//!
//! - **纯函数** - 无 I/O、无共享可变状态，输入快照即可复现结果
//! - **有界输出** - 最终匹配度始终位于 [0, 1]
//! - **显式维度** - 知识状态与领域权重通过 [`DomainIndex`] 对齐
//!
//! ## 模块结构
//!
//! - [`similarity`] - 余弦相似度
//! - [`gap`] - 薄弱点覆盖率
//! - [`difficulty`] - 渐进难度估计
//! - [`affinity`] - 匹配度聚合与批量排序
//! - [`domain`] - 领域索引注册表
//! - [`sanitize`] - 数值校验
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use affinity_algo::{compute_affinity, ContentItem, DomainIndex, LearnerProfile};
//!
//! let index = DomainIndex::new(["math", "physics"]);
//!
//! let mut learner = LearnerProfile::new("learner-1");
//! learner.knowledge_state = vec![0.2, 0.8];
//! learner.learning_preferences = vec![1.0, 0.0];
//!
//! let content = ContentItem {
//!     id: "quiz-1".to_string(),
//!     difficulty_vector: vec![0.5, 0.5],
//!     knowledge_domains: BTreeMap::from([("math".to_string(), 1.0)]),
//!     pedagogical_attributes: vec![1.0, 0.0],
//! };
//!
//! let breakdown = compute_affinity(&learner, &content, &index).unwrap();
//! assert!((0.0..=1.0).contains(&breakdown.score));
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod affinity;
pub mod difficulty;
pub mod domain;
pub mod error;
pub mod gap;
pub mod sanitize;
pub mod similarity;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出错误类型
pub use error::AlgoError;

/// 重新导出领域索引
pub use domain::DomainIndex;

/// 重新导出相似度原语
pub use similarity::{cosine_similarity, Similarity};

/// 重新导出各项信号
pub use difficulty::progressive_difficulty;
pub use gap::gap_coverage;

/// 重新导出聚合器
pub use affinity::{compute_affinity, rank_contents, AffinityWeights};
