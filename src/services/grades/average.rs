//! 加权平均：每条成绩权重为 1 / 小组人数

/// 根据 `(score, group_size)` 计算加权平均，无有效成绩时为 `None`
pub fn weighted_average<I>(items: I) -> Option<f64>
where
    I: IntoIterator<Item = (i32, u32)>,
{
    let (sum, weights) = items
        .into_iter()
        .filter(|&(_, size)| size > 0)
        .fold((0.0_f64, 0.0_f64), |(sum, weights), (score, size)| {
            let weight = 1.0 / f64::from(size);
            (sum + f64::from(score) * weight, weights + weight)
        });

    (weights > 0.0).then(|| sum / weights)
}
