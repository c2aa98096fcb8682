//! 预生成噪声表
//!
//! 生成后只读，各粒子用自己的游标按模回绕采样，无需同步。

/// 均匀随机噪声表，样本范围 `[0, 1)`
#[derive(Debug, Clone)]
pub struct NoiseTable {
    samples: Vec<f32>,
}

impl NoiseTable {
    pub fn new(len: usize) -> Self {
        let len = len.max(1);
        let samples = (0..len).map(|_| rand::random::<f32>()).collect();
        Self { samples }
    }

    /// 采样，下标按表长回绕
    pub fn sample(&self, index: usize) -> f32 {
        self.samples[index % self.samples.len()]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
