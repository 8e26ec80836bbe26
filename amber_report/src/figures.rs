//! Figure definitions: which methods go into each panel, under which label,
//! with which buckets, and which headline ratios are reported alongside.
//!
//! The built-in presets reproduce the CAMI I comparison figures. A JSON file
//! holding a list of [`FigureSpec`] can add figures or replace a preset of the
//! same name.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{AmberError, AmberResult, Bucket};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    pub name: String,
    pub panels: Vec<PanelSpec>,
    #[serde(default)]
    pub comparisons: Vec<Comparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    #[serde(default)]
    pub title: Option<String>,
    pub methods: Vec<MethodEntry>,
    #[serde(default = "default_buckets")]
    pub buckets: Vec<Bucket>,
}

/// A method directory name and the label it is shown under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl MethodEntry {
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Headline ratios, all computed on the >90 bucket using method ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparison {
    /// Best method of a panel over the runner-up.
    BestOverSecond {
        #[serde(default)]
        panel: usize,
    },
    Pairwise {
        subject: String,
        baseline: String,
    },
    /// Mean of the pairwise improvements of `subject` over each baseline.
    MeanOver {
        subject: String,
        baselines: Vec<String>,
    },
}

fn default_buckets() -> Vec<Bucket> {
    vec![Bucket::Over90, Bucket::Over80, Bucket::Over70, Bucket::Over60]
}

fn m(id: &str) -> MethodEntry {
    MethodEntry {
        id: id.to_string(),
        label: None,
    }
}

fn renamed(id: &str, label: &str) -> MethodEntry {
    MethodEntry {
        id: id.to_string(),
        label: Some(label.to_string()),
    }
}

fn panel(methods: Vec<MethodEntry>) -> PanelSpec {
    PanelSpec {
        title: None,
        methods,
        buckets: default_buckets(),
    }
}

fn figure(name: &str, panels: Vec<PanelSpec>, comparisons: Vec<Comparison>) -> FigureSpec {
    FigureSpec {
        name: name.to_string(),
        panels,
        comparisons,
    }
}

fn pairwise(subject: &str, baseline: &str) -> Comparison {
    Comparison::Pairwise {
        subject: subject.to_string(),
        baseline: baseline.to_string(),
    }
}

fn cat_vs_mmseqs(edges: u32) -> PanelSpec {
    PanelSpec {
        title: Some(format!("max_edges={edges}")),
        ..panel(vec![
            renamed(&format!("SemiBin_CAT_{edges}"), "CAT"),
            renamed(&format!("SemiBin_{edges}"), "MMseqs2"),
        ])
    }
}

/// The published figure layouts.
///
/// `recluster`, `cluster_alternative` and `recluster_alternative` also carry a
/// headline ratio that the published figures only showed as bars; the ratio is
/// an extra summary line and leaves the panel tables unchanged.
pub fn builtin_figures() -> Vec<FigureSpec> {
    vec![
        figure(
            "comparison",
            vec![panel(vec![
                m("COCACOLA"),
                renamed("SolidBin_SFS_CL", "SolidBin-SFS-CL"),
                renamed("SolidBin_CL", "SolidBin-CL"),
                renamed("SolidBin_naive", "SolidBin-naive"),
                m("VAMB"),
                renamed("SolidBin_coalign", "SolidBin-coalign"),
                m("Maxbin2"),
                renamed("Metabat2_200", "Metabat2"),
                renamed("SemiBin_200", "SemiBin"),
            ])],
            vec![Comparison::BestOverSecond { panel: 0 }],
        ),
        figure(
            "semibin_metabat",
            vec![panel(vec![
                m("Metabat2_200"),
                m("Metabat2_500"),
                m("Metabat2_1000"),
                m("SemiBin_200"),
                m("SemiBin_500"),
                m("SemiBin_1000"),
            ])],
            vec![],
        ),
        figure(
            "cat_mmseqs",
            vec![cat_vs_mmseqs(200), cat_vs_mmseqs(500), cat_vs_mmseqs(1000)],
            vec![],
        ),
        figure(
            "semi_nosemi",
            vec![panel(vec![
                m("NoSemi_200"),
                m("NoSemi_500"),
                m("NoSemi_1000"),
                m("SemiBin_200"),
                m("SemiBin_500"),
                m("SemiBin_1000"),
            ])],
            vec![
                pairwise("SemiBin_200", "NoSemi_200"),
                pairwise("SemiBin_500", "NoSemi_500"),
                pairwise("SemiBin_1000", "NoSemi_1000"),
            ],
        ),
        figure(
            "generalization",
            vec![PanelSpec {
                buckets: vec![Bucket::Over90],
                ..panel(vec![
                    renamed("NoSemi_200", "NoSemi"),
                    m("SemiBin_m"),
                    m("SemiBin_c"),
                    m("SemiBin_mc"),
                    renamed("SemiBin_200", "SemiBin"),
                ])
            }],
            vec![
                pairwise("SemiBin_200", "SemiBin_m"),
                pairwise("SemiBin_200", "SemiBin_c"),
                pairwise("SemiBin_200", "SemiBin_mc"),
                Comparison::MeanOver {
                    subject: "SemiBin_200".to_string(),
                    baselines: vec![
                        "SemiBin_m".to_string(),
                        "SemiBin_c".to_string(),
                        "SemiBin_mc".to_string(),
                    ],
                },
            ],
        ),
        figure(
            "recluster",
            vec![panel(vec![
                renamed("SemiBin_no_recluster", "No_recluster"),
                m("SemiBin"),
            ])],
            vec![pairwise("SemiBin", "SemiBin_no_recluster")],
        ),
        figure(
            "cluster_alternative",
            vec![panel(vec![
                renamed("lp", "Label propagation"),
                renamed("leiden", "Leiden"),
                renamed("multi_level", "Louvain"),
                renamed("infomap", "Infomap"),
            ])],
            vec![Comparison::BestOverSecond { panel: 0 }],
        ),
        figure(
            "recluster_alternative",
            vec![panel(vec![
                renamed("spec", "Spectral"),
                renamed("agg", "Agglomerative"),
                renamed("dbscan", "DBSCAN"),
                renamed("kmeans", "KMeans"),
            ])],
            vec![Comparison::BestOverSecond { panel: 0 }],
        ),
        figure(
            "embeddings",
            vec![panel(vec![
                renamed("hidden1", "Hidden1"),
                renamed("hidden2", "Hidden2"),
                renamed("output", "Output"),
            ])],
            vec![],
        ),
        figure(
            "remove_genomes",
            vec![panel(vec![
                renamed("Ori", "Origin"),
                renamed("species", "Species"),
                renamed("genus", "Genus"),
                renamed("family", "Family"),
                renamed("order", "Order"),
                renamed("class", "Class"),
                renamed("phylum", "Phylum"),
            ])],
            vec![],
        ),
    ]
}

/// Built-ins plus anything loaded from JSON; later definitions win by name.
#[derive(Debug, Clone)]
pub struct FigureCatalog {
    figures: BTreeMap<String, FigureSpec>,
}

impl FigureCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self {
            figures: BTreeMap::new(),
        };
        catalog.extend(builtin_figures());
        catalog
    }

    pub fn extend(&mut self, figures: Vec<FigureSpec>) {
        for figure in figures {
            self.figures.insert(figure.name.clone(), figure);
        }
    }

    pub fn load_json(&mut self, path: &Path) -> AmberResult<()> {
        let reader = BufReader::new(File::open(path)?);
        let figures: Vec<FigureSpec> = serde_json::from_reader(reader)?;
        info!("Loaded {} figure definitions from {}", figures.len(), path.display());
        self.extend(figures);
        Ok(())
    }

    pub fn get(&self, name: &str) -> AmberResult<&FigureSpec> {
        self.figures
            .get(name)
            .ok_or_else(|| AmberError::UnknownFigure(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.figures.keys().map(String::as_str)
    }
}
