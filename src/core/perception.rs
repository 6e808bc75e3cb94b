use crate::domain::model::{Blob, Detection, Frame, Observation, OreKind};

/// Nearest-centroid classifier over (hue, brightness).
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    centroids: Vec<(OreKind, (f32, f32))>,
    sigma: f32,
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl SignatureClassifier {
    pub fn new(sigma: f32) -> Self {
        Self {
            centroids: OreKind::ALL.iter().map(|k| (*k, k.signature())).collect(),
            sigma: sigma.max(f32::EPSILON),
        }
    }

    /// Best class and its softmax confidence.
    pub fn classify(&self, hue: f32, brightness: f32) -> (OreKind, f32) {
        let two_sigma_sq = 2.0 * self.sigma * self.sigma;
        let scores: Vec<(OreKind, f32)> = self
            .centroids
            .iter()
            .map(|(kind, (h, b))| {
                let d_sq = (hue - h).powi(2) + (brightness - b).powi(2);
                (*kind, -d_sq / two_sigma_sq)
            })
            .collect();

        // log-sum-exp 避免下溢
        let max_score = scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f32::NEG_INFINITY, f32::max);
        let total: f32 = scores.iter().map(|(_, s)| (s - max_score).exp()).sum();

        scores
            .iter()
            .map(|(kind, s)| (*kind, (s - max_score).exp() / total))
            .fold((OreKind::Rock, 0.0), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FramePerception {
    classifier: SignatureClassifier,
}

impl FramePerception {
    pub fn new(classifier: SignatureClassifier) -> Self {
        Self { classifier }
    }

    fn detect(&self, blob: &Blob) -> Detection {
        let (kind, confidence) = self.classifier.classify(blob.hue, blob.brightness);
        Detection {
            position: blob.position,
            kind,
            confidence,
        }
    }

    pub fn observe(&self, frame: &Frame) -> Observation {
        let detections = frame.blobs.iter().map(|b| self.detect(b)).collect();
        Observation {
            tick: frame.tick,
            agent: frame.agent,
            stamina: frame.stamina,
            detections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Position;

    #[test]
    fn test_exact_signatures_classify_confidently() {
        let classifier = SignatureClassifier::default();
        for kind in OreKind::ALL {
            let (hue, brightness) = kind.signature();
            let (label, confidence) = classifier.classify(hue, brightness);
            assert_eq!(label, kind);
            assert!(confidence > 0.5, "{:?} confidence {}", kind, confidence);
        }
    }

    #[test]
    fn test_ambiguous_blob_has_low_confidence() {
        let classifier = SignatureClassifier::default();
        let (copper, rock) = (OreKind::Copper.signature(), OreKind::Rock.signature());
        let midpoint = ((copper.0 + rock.0) / 2.0, (copper.1 + rock.1) / 2.0);
        let (_, confidence) = classifier.classify(midpoint.0, midpoint.1);
        assert!(confidence < 0.6);
    }

    #[test]
    fn test_observe_keeps_frame_state() {
        let perception = FramePerception::default();
        let (hue, brightness) = OreKind::Iron.signature();
        let frame = Frame {
            tick: 9,
            width: 10,
            height: 10,
            agent: Position::new(1, 2),
            stamina: 40,
            blobs: vec![Blob {
                position: Position::new(4, 4),
                hue,
                brightness,
            }],
        };

        let obs = perception.observe(&frame);
        assert_eq!(obs.tick, 9);
        assert_eq!(obs.agent, Position::new(1, 2));
        assert_eq!(obs.stamina, 40);
        assert_eq!(obs.detections.len(), 1);
        assert_eq!(obs.detections[0].kind, OreKind::Iron);
        assert!(obs.sees(&Position::new(4, 4)));
    }
}
