//! Boosted Haar cascade model in OpenCV's `opencv_storage` XML layout.
//!
//! Only the current layout (`<cascade>` with `stageType` BOOST and
//! `featureType` HAAR) is understood. Tilted features are rejected.
use std::path::Path;
use std::str::FromStr;

use roxmltree::Node;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("failed to read cascade file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed cascade XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("cascade is missing <{0}>")]
    Missing(&'static str),
    #[error("invalid cascade: {0}")]
    Invalid(String),
    #[error("unsupported cascade: {0}")]
    Unsupported(String),
}

/// One weighted rectangle of a Haar feature, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HaarFeature {
    pub rects: Vec<WeightedRect>,
}

/// Split node of a weak classifier tree.
///
/// Child indices `> 0` point at another node; `<= 0` encode leaf `-index`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeNode {
    pub left: i32,
    pub right: i32,
    pub feature: usize,
    pub threshold: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeakClassifier {
    pub nodes: Vec<TreeNode>,
    pub leaves: Vec<f64>,
}

impl WeakClassifier {
    /// Walks the tree, asking `feature_value` for each visited feature.
    #[inline]
    pub fn evaluate(&self, mut feature_value: impl FnMut(usize) -> f64) -> f64 {
        let mut idx = 0i32;
        loop {
            let node = &self.nodes[idx as usize];
            idx = if feature_value(node.feature) < node.threshold {
                node.left
            } else {
                node.right
            };
            if idx <= 0 {
                return self.leaves[(-idx) as usize];
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub threshold: f64,
    pub classifiers: Vec<WeakClassifier>,
}

/// A parsed, validated cascade. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct HaarCascade {
    window_width: u32,
    window_height: u32,
    stages: Vec<Stage>,
    features: Vec<HaarFeature>,
}

impl HaarCascade {
    pub fn load(path: &Path) -> Result<Self, CascadeError> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn features(&self) -> &[HaarFeature] {
        &self.features
    }

    fn validate(&self) -> Result<(), CascadeError> {
        if self.window_width < 3 || self.window_height < 3 {
            return Err(CascadeError::Invalid(format!(
                "window {}x{} is too small",
                self.window_width, self.window_height
            )));
        }
        if self.stages.is_empty() {
            return Err(CascadeError::Invalid("no stages".into()));
        }
        for (fi, feature) in self.features.iter().enumerate() {
            for r in &feature.rects {
                if r.x.saturating_add(r.width) > self.window_width
                    || r.y.saturating_add(r.height) > self.window_height
                {
                    return Err(CascadeError::Invalid(format!(
                        "feature {fi} rectangle exceeds the detection window"
                    )));
                }
            }
        }
        for (si, stage) in self.stages.iter().enumerate() {
            for wc in &stage.classifiers {
                for node in &wc.nodes {
                    if node.feature >= self.features.len() {
                        return Err(CascadeError::Invalid(format!(
                            "stage {si} references missing feature {}",
                            node.feature
                        )));
                    }
                    for child in [node.left, node.right] {
                        let ok = if child > 0 {
                            (child as usize) < wc.nodes.len()
                        } else {
                            ((-child) as usize) < wc.leaves.len()
                        };
                        if !ok {
                            return Err(CascadeError::Invalid(format!(
                                "stage {si} has a dangling tree index {child}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromStr for HaarCascade {
    type Err = CascadeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let doc = roxmltree::Document::parse(text)?;
        let cascade = child(doc.root_element(), "cascade")?;

        let stage_type = child_text(cascade, "stageType")?;
        if stage_type != "BOOST" {
            return Err(CascadeError::Unsupported(format!("stage type {stage_type}")));
        }
        let feature_type = child_text(cascade, "featureType")?;
        if feature_type != "HAAR" {
            return Err(CascadeError::Unsupported(format!(
                "feature type {feature_type}"
            )));
        }

        let window_width = parse_one(child_text(cascade, "width")?, "width")?;
        let window_height = parse_one(child_text(cascade, "height")?, "height")?;

        let stages = items(child(cascade, "stages")?)
            .map(parse_stage)
            .collect::<Result<Vec<_>, _>>()?;
        let features = items(child(cascade, "features")?)
            .map(parse_feature)
            .collect::<Result<Vec<_>, _>>()?;

        let model = HaarCascade {
            window_width,
            window_height,
            stages,
            features,
        };
        model.validate()?;
        Ok(model)
    }
}

fn parse_stage(node: Node<'_, '_>) -> Result<Stage, CascadeError> {
    let threshold = parse_one(child_text(node, "stageThreshold")?, "stageThreshold")?;
    let classifiers = items(child(node, "weakClassifiers")?)
        .map(parse_weak_classifier)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Stage {
        threshold,
        classifiers,
    })
}

fn parse_weak_classifier(node: Node<'_, '_>) -> Result<WeakClassifier, CascadeError> {
    let raw_nodes: Vec<f64> = parse_list(child_text(node, "internalNodes")?, "internalNodes")?;
    let leaves: Vec<f64> = parse_list(child_text(node, "leafValues")?, "leafValues")?;

    if raw_nodes.is_empty() || raw_nodes.len() % 4 != 0 {
        return Err(CascadeError::Unsupported(format!(
            "internalNodes with {} values (categorical splits are not supported)",
            raw_nodes.len()
        )));
    }

    let nodes = raw_nodes
        .chunks_exact(4)
        .map(|n| TreeNode {
            left: n[0] as i32,
            right: n[1] as i32,
            feature: n[2] as usize,
            threshold: n[3],
        })
        .collect();

    Ok(WeakClassifier { nodes, leaves })
}

fn parse_feature(node: Node<'_, '_>) -> Result<HaarFeature, CascadeError> {
    if let Ok(tilted) = child_text(node, "tilted") {
        if tilted != "0" {
            return Err(CascadeError::Unsupported("tilted features".into()));
        }
    }
    let rects = items(child(node, "rects")?)
        .map(|r| {
            let values: Vec<f64> = parse_list(text(r), "rects")?;
            if values.len() != 5 {
                return Err(CascadeError::Invalid(format!(
                    "feature rectangle needs 5 values, got {}",
                    values.len()
                )));
            }
            if values[..4].iter().any(|v| *v < 0.0) {
                return Err(CascadeError::Invalid("negative rectangle geometry".into()));
            }
            Ok(WeightedRect {
                x: values[0] as u32,
                y: values[1] as u32,
                width: values[2] as u32,
                height: values[3] as u32,
                weight: values[4],
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if rects.is_empty() {
        return Err(CascadeError::Invalid("feature without rectangles".into()));
    }
    Ok(HaarFeature { rects })
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, CascadeError> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .ok_or(CascadeError::Missing(name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &'static str) -> Result<&'a str, CascadeError> {
    Ok(text(child(node, name)?))
}

fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("").trim()
}

/// Element children of a sequence node (`<_>` entries).
fn items<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

fn parse_one<T: FromStr>(s: &str, what: &str) -> Result<T, CascadeError> {
    s.parse()
        .map_err(|_| CascadeError::Invalid(format!("bad {what} value '{s}'")))
}

fn parse_list<T: FromStr>(s: &str, what: &str) -> Result<Vec<T>, CascadeError> {
    s.split_whitespace().map(|v| parse_one(v, what)).collect()
}

/// One-stage cascade that fires on a dark 12x12 center inside a bright
/// 24x24 window. Shared by the parser and detector tests.
#[cfg(test)]
pub(crate) const DARK_CENTER_CASCADE_XML: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier">
  <stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>24</height>
  <width>24</width>
  <stageParams><maxWeakCount>1</maxWeakCount></stageParams>
  <featureParams><maxCatCount>0</maxCatCount></featureParams>
  <stageNum>1</stageNum>
  <stages>
    <!-- stage 0 -->
    <_>
      <maxWeakCount>1</maxWeakCount>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 0 -1.</internalNodes>
          <leafValues>
            1. -1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>
          0 0 24 24 -1.</_>
        <_>
          6 6 12 12 4.</_></rects></_></features>
</cascade>
</opencv_storage>
"#;
