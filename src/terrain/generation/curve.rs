// ============================================
// Height Curve - Кривая перераспределения высот
// ============================================

use serde::{Deserialize, Serialize};

/// Ключевая точка кривой (Hermite)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self { time, value, in_tangent, out_tangent }
    }
}

/// Неизменяемая кривая: копия уходит в каждую фоновую задачу
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl From<Vec<CurveKey>> for HeightCurve {
    fn from(mut keys: Vec<CurveKey>) -> Self {
        keys.retain(|k| k.time.is_finite() && k.value.is_finite());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }
}

impl From<HeightCurve> for Vec<CurveKey> {
    fn from(curve: HeightCurve) -> Self {
        curve.keys
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl HeightCurve {
    /// y = x на 0..1
    pub fn linear() -> Self {
        Self::from(vec![CurveKey::new(0.0, 0.0, 1.0, 1.0), CurveKey::new(1.0, 1.0, 1.0, 1.0)])
    }

    pub fn constant(value: f32) -> Self {
        Self::from(vec![CurveKey::new(0.0, value, 0.0, 0.0)])
    }

    /// Ломаная через точки (time, value)
    pub fn piecewise_linear(points: &[(f32, f32)]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let slope = |i: usize, j: usize| {
            let (t0, v0) = sorted[i];
            let (t1, v1) = sorted[j];
            if t1 > t0 { (v1 - v0) / (t1 - t0) } else { 0.0 }
        };

        let keys: Vec<CurveKey> = (0..sorted.len())
            .map(|i| {
                let in_tangent = if i > 0 { slope(i - 1, i) } else { 0.0 };
                let out_tangent = if i + 1 < sorted.len() { slope(i, i + 1) } else { 0.0 };
                CurveKey::new(sorted[i].0, sorted[i].1, in_tangent, out_tangent)
            })
            .collect();

        Self::from(keys)
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Значение кривой; вне диапазона ключей - значение крайнего ключа
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // Первый ключ с time > t; t строго внутри, значит 1..len
        let next = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];

        let dt = k1.time - k0.time;
        if dt <= 0.0 {
            return k1.value;
        }
        let s = (t - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

/// Финальное преобразование сырой высоты: curve(v) * multiplier.
/// Без кривой высота проходит как есть (карта уже преобразована).
#[derive(Debug, Clone, PartialEq)]
pub struct HeightRemap {
    pub multiplier: f32,
    pub curve: Option<HeightCurve>,
}

impl HeightRemap {
    pub fn new(multiplier: f32, curve: HeightCurve) -> Self {
        Self { multiplier, curve: Some(curve) }
    }

    pub fn passthrough() -> Self {
        Self { multiplier: 1.0, curve: None }
    }

    #[inline]
    pub fn evaluate(&self, value: f32) -> f32 {
        match &self.curve {
            Some(curve) => curve.evaluate(value) * self.multiplier,
            None => value,
        }
    }
}
