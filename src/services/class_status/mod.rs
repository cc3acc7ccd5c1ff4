pub mod aggregate;

use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::models::class_status::{
    requests::ClassStatusOrder, responses::ClassStatusResponse,
};
use crate::storage::Storage;

pub struct ClassStatusService {
    storage: Arc<dyn Storage>,
}

impl ClassStatusService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 教师视角的班级状态
    pub async fn status_for(
        &self,
        teacher_id: i64,
        order: ClassStatusOrder,
    ) -> Result<ClassStatusResponse> {
        let students = self.storage.list_students().await?;
        let participations = self.storage.list_teacher_participations(teacher_id).await?;

        debug!(
            "Class status for teacher {}: {} students, {} participations",
            teacher_id,
            students.len(),
            participations.len()
        );

        let mut items = aggregate::aggregate(students, &participations);
        aggregate::sort_statuses(&mut items, order);

        Ok(ClassStatusResponse { order, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::class_status::entities::StudentStatus;
    use crate::test_support::setup;

    fn ids(items: &[StudentStatus]) -> Vec<i64> {
        items.iter().map(|s| s.student_id).collect()
    }

    #[tokio::test]
    async fn class_status_covers_every_student() {
        let ctx = setup().await;

        // zoe(0) 与 marco(1)：已评分 28
        ctx.create_graded(&ctx.teacher, &[0, 1], 28).await;
        // zoe(0) 与 anna(2)：开放中
        ctx.create(&ctx.teacher, &[0, 2]).await.expect("create");
        // marco(1)、anna(2)、luca(3)：已评分 22
        ctx.create_graded(&ctx.teacher, &[1, 2, 3], 22).await;
        // 另一名教师的任务不计入
        ctx.create_graded(&ctx.other_teacher, &[4, 5], 30).await;

        let service = ClassStatusService::new(ctx.storage.clone());
        let status = service
            .status_for(ctx.teacher.id, ClassStatusOrder::Average)
            .await
            .expect("status");
        assert_eq!(status.items.len(), 6);

        let by_id = |index: usize| {
            status
                .items
                .iter()
                .find(|s| s.student_id == ctx.student(index).id)
                .expect("every student has a row")
        };

        let zoe = by_id(0);
        assert_eq!((zoe.open_count, zoe.closed_count), (1, 1));
        assert_eq!(zoe.weighted_average, Some(28.0));

        let marco = by_id(1);
        assert_eq!((marco.open_count, marco.closed_count), (0, 2));
        let expected = (28.0 * 0.5 + 22.0 / 3.0) / (0.5 + 1.0 / 3.0);
        let average = marco.weighted_average.expect("marco has grades");
        assert!((average - expected).abs() < 1e-9);

        let anna = by_id(2);
        assert_eq!((anna.open_count, anna.closed_count), (1, 1));
        assert_eq!(anna.weighted_average, Some(22.0));

        let bea = by_id(4);
        assert_eq!((bea.open_count, bea.closed_count), (0, 0));
        assert_eq!(bea.weighted_average, None);

        // 平均分降序，空值最后，平局按 ID
        assert_eq!(ids(&status.items), ctx.student_ids(&[0, 1, 2, 3, 4, 5]));
    }

    #[tokio::test]
    async fn class_status_orderings() {
        let ctx = setup().await;

        ctx.create_graded(&ctx.teacher, &[3, 4], 30).await;
        ctx.create(&ctx.teacher, &[2, 4]).await.expect("create");
        ctx.create(&ctx.teacher, &[2, 3, 5]).await.expect("create");

        let service = ClassStatusService::new(ctx.storage.clone());

        // 名称不区分大小写：anna, Bea, Fabio, Luca, Marco, Zoe
        let alphabetical = service
            .status_for(ctx.teacher.id, ClassStatusOrder::Alphabetical)
            .await
            .expect("status");
        assert_eq!(
            ids(&alphabetical.items),
            ctx.student_ids(&[2, 4, 5, 3, 1, 0])
        );

        // anna 2、luca 2、bea 2、fabio 1、zoe 0、marco 0
        let by_count = service
            .status_for(ctx.teacher.id, ClassStatusOrder::AssignmentCount)
            .await
            .expect("status");
        assert_eq!(by_count.items[0].assignment_count(), 2);
        assert_eq!(ids(&by_count.items), ctx.student_ids(&[2, 3, 4, 5, 0, 1]));

        let by_average = service
            .status_for(ctx.teacher.id, ClassStatusOrder::Average)
            .await
            .expect("status");
        assert_eq!(ids(&by_average.items), ctx.student_ids(&[3, 4, 0, 1, 2, 5]));
        assert_eq!(by_average.order, ClassStatusOrder::Average);
    }
}
